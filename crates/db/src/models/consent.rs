//! Cookie-consent record model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A row from the `consent_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConsentRecord {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub ip_address: Option<String>,
    pub consent_status: String,
    pub policy_version: String,
    pub analytical_accepted: bool,
    pub marketing_accepted: bool,
    pub timestamp: Timestamp,
}

/// Fields the client submits. User and IP are filled in by the server.
#[derive(Debug, Deserialize)]
pub struct CreateConsentRecord {
    pub consent_status: String,
    pub policy_version: Option<String>,
    #[serde(default)]
    pub analytical_accepted: bool,
    #[serde(default)]
    pub marketing_accepted: bool,
}
