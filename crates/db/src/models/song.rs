//! Bell song suggestion model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A suggestion row joined with the submitter's username and whether the
/// requesting user has voted for it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SongSuggestion {
    pub id: DbId,
    #[serde(skip)]
    pub user_id: DbId,
    pub user_username: String,
    pub title: String,
    pub link: String,
    pub slot: String,
    pub note: Option<String>,
    pub status: String,
    pub votes: i32,
    pub has_voted: bool,
    pub submitted_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateSongSuggestion {
    pub title: String,
    pub link: String,
    pub slot: String,
    pub note: Option<String>,
}
