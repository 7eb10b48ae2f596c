//! Site notification (banner) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    /// Markdown source.
    pub text: String,
    pub enabled: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateNotification {
    pub text: String,
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotification {
    pub text: Option<String>,
    pub enabled: Option<bool>,
}
