//! Repository for the `comments` table.

use sqlx::PgPool;
use schoolhub_core::comments::{CommentRateLimit, ParentRef};
use schoolhub_core::types::{DbId, Timestamp};

use crate::models::comment::{Comment, CommentInsert, CreateComment};

/// Joined select: author and parent-author usernames plus reply count.
const SELECT_COMMENT: &str = "SELECT c.id, c.post_id, c.user_id, u.username, c.content, \
                              c.parent_id, pu.username AS parent_username, \
                              (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count, \
                              c.created_at \
                              FROM comments c \
                              JOIN users u ON u.id = c.user_id \
                              LEFT JOIN comments pc ON pc.id = c.parent_id \
                              LEFT JOIN users pu ON pu.id = pc.user_id";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// All comments on a post, newest first.
    pub async fn list_for_post(pool: &PgPool, post_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "{SELECT_COMMENT} WHERE c.post_id = $1 ORDER BY c.created_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Recent comments across all posts, for moderation.
    pub async fn list_recent(
        pool: &PgPool,
        post_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "{SELECT_COMMENT}
             WHERE ($1::BIGINT IS NULL OR c.post_id = $1)
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("{SELECT_COMMENT} WHERE c.id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The threading fields of a prospective parent comment.
    pub async fn find_parent_ref(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ParentRef>, sqlx::Error> {
        let row: Option<(DbId, DbId, Option<DbId>)> =
            sqlx::query_as("SELECT id, post_id, parent_id FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(id, post_id, parent_id)| ParentRef {
            id,
            post_id,
            parent_id,
        }))
    }

    /// Insert a comment unless the author is over `limit`.
    ///
    /// The author's user row is locked while the window is counted and the
    /// comment inserted, so concurrent posts by one user are serialized and
    /// cannot all pass the check.
    pub async fn create_rate_limited(
        pool: &PgPool,
        input: &CreateComment,
        limit: &CommentRateLimit,
        now: Timestamp,
    ) -> Result<CommentInsert, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        let recent: Vec<Timestamp> = sqlx::query_scalar(
            "SELECT created_at FROM comments
             WHERE user_id = $1 AND created_at >= $2
             ORDER BY created_at ASC",
        )
        .bind(input.user_id)
        .bind(limit.window_start(now))
        .fetch_all(&mut *tx)
        .await?;
        if let Some(retry_after_secs) = limit.retry_after(&recent, now) {
            return Ok(CommentInsert::RateLimited { retry_after_secs });
        }

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO comments (post_id, user_id, parent_id, content)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(input.post_id)
        .bind(input.user_id)
        .bind(input.parent_id)
        .bind(&input.content)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        let comment = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(CommentInsert::Created(comment))
    }

    /// Delete a comment and, by cascade, its replies.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
