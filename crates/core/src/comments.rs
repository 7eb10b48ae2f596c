//! Comment validation, reply threading, and per-user rate limiting.
//!
//! Threads are one level deep: a reply to a reply is attached to the
//! top-level comment it belongs to.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length of comment content in characters.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Default number of comments a user may post per window.
pub const DEFAULT_RATE_LIMIT_MAX: i64 = 5;

/// Default rate-limit window in seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: i64 = 60;

/// The fields of a prospective parent comment needed to thread a reply.
#[derive(Debug, Clone, Copy)]
pub struct ParentRef {
    pub id: DbId,
    pub post_id: DbId,
    pub parent_id: Option<DbId>,
}

/// Sliding-window limit on comment creation.
#[derive(Debug, Clone, Copy)]
pub struct CommentRateLimit {
    pub max_comments: i64,
    pub window_secs: i64,
}

impl Default for CommentRateLimit {
    fn default() -> Self {
        Self {
            max_comments: DEFAULT_RATE_LIMIT_MAX,
            window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl CommentRateLimit {
    /// Start of the window that ends at `now`.
    pub fn window_start(&self, now: Timestamp) -> Timestamp {
        now - Duration::seconds(self.window_secs)
    }

    /// Seconds until another comment may be posted, or `None` if one may be
    /// posted now.
    ///
    /// `recent` holds the creation times of the user's comments since
    /// [`window_start`](Self::window_start), oldest first. When the user is at
    /// or over the limit, the hint runs until enough of them have left the
    /// window to bring the count below the limit (at least 1 second).
    pub fn retry_after(&self, recent: &[Timestamp], now: Timestamp) -> Option<i64> {
        let count = recent.len() as i64;
        if count < self.max_comments {
            return None;
        }
        let releasing = usize::try_from(count - self.max_comments).unwrap_or(0);
        let secs = recent
            .get(releasing)
            .map(|t| (*t + Duration::seconds(self.window_secs) - now).num_seconds())
            .unwrap_or(self.window_secs);
        Some(secs.max(1))
    }

    /// Like [`retry_after`](Self::retry_after), as a `RateLimited` error.
    pub fn check(&self, recent: &[Timestamp], now: Timestamp) -> Result<(), CoreError> {
        match self.retry_after(recent, now) {
            None => Ok(()),
            Some(retry_after_secs) => Err(CoreError::RateLimited { retry_after_secs }),
        }
    }
}

/// Validate comment content: non-empty after trimming and within the limit.
pub fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Comment content cannot be empty".to_string());
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Work out which comment a new reply should hang under.
///
/// Returns `None` for a top-level comment. A parent from a different post is
/// rejected; a parent that is itself a reply is replaced by its own parent.
pub fn resolve_parent(post_id: DbId, parent: Option<ParentRef>) -> Result<Option<DbId>, String> {
    let Some(parent) = parent else {
        return Ok(None);
    };
    if parent.post_id != post_id {
        return Err(format!(
            "Parent comment {} does not belong to post {post_id}",
            parent.id
        ));
    }
    Ok(Some(parent.parent_id.unwrap_or(parent.id)))
}
