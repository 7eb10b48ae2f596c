//! Contact-form submission model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A row from the `contact_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactSubmission {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}
