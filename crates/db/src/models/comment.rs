//! Comment models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A comment row joined with author and parent-author usernames and the
/// number of direct replies.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub content: String,
    pub parent_id: Option<DbId>,
    pub parent_username: Option<String>,
    /// Replies to this comment; always 0 for replies themselves.
    pub reply_count: i64,
    pub created_at: Timestamp,
}

/// DTO for inserting a comment. `parent_id` must already be resolved to a
/// top-level comment.
#[derive(Debug)]
pub struct CreateComment {
    pub post_id: DbId,
    pub user_id: DbId,
    pub parent_id: Option<DbId>,
    pub content: String,
}

/// Result of a rate-limited comment insert.
#[derive(Debug)]
pub enum CommentInsert {
    Created(Comment),
    /// Nothing was inserted; the user may try again after this many seconds.
    RateLimited { retry_after_secs: i64 },
}
