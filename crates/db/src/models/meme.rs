//! Meme-of-the-week model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A meme row joined with the uploader's username and whether the requesting
/// user has voted for it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Meme {
    pub id: DbId,
    #[serde(skip)]
    pub user_id: DbId,
    pub user_username: String,
    pub title: String,
    /// Path relative to the media root.
    #[serde(skip)]
    pub image_path: String,
    pub is_approved: bool,
    pub votes: i32,
    pub has_voted: bool,
    pub created_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateMeme {
    pub user_id: DbId,
    pub title: String,
    pub image_path: String,
}
