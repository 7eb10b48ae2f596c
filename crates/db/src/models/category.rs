//! Post category model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub full_name: String,
    /// URL slug, unique.
    pub short_name: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub full_name: String,
    pub short_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategory {
    pub full_name: Option<String>,
    pub short_name: Option<String>,
}
