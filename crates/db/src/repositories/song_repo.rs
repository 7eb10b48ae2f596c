//! Repository for bell song suggestions and their votes.

use sqlx::PgPool;
use schoolhub_core::media::STATUS_APPROVED;
use schoolhub_core::types::DbId;

use crate::models::song::{CreateSongSuggestion, SongSuggestion};
use crate::models::vote::VoteChange;

/// Joined select; `$1` is the viewing user (nullable) for `has_voted`.
const SELECT_SONG: &str = "SELECT s.id, s.user_id, u.username AS user_username, s.title, s.link, \
                           s.slot, s.note, s.status, s.votes, \
                           EXISTS(SELECT 1 FROM song_suggestion_votes v \
                                  WHERE v.suggestion_id = s.id AND v.user_id = $1) AS has_voted, \
                           s.submitted_at \
                           FROM song_suggestions s \
                           JOIN users u ON u.id = s.user_id";

pub struct SongRepo;

impl SongRepo {
    /// Approved suggestions plus the viewer's own, newest first.
    pub async fn list_visible(
        pool: &PgPool,
        viewer: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SongSuggestion>, sqlx::Error> {
        let query = format!(
            "{SELECT_SONG}
             WHERE s.status = $2 OR s.user_id = $1
             ORDER BY s.submitted_at DESC, s.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, SongSuggestion>(&query)
            .bind(viewer)
            .bind(STATUS_APPROVED)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every suggestion, optionally filtered by status, for moderation.
    pub async fn list_all(
        pool: &PgPool,
        viewer: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SongSuggestion>, sqlx::Error> {
        let query = format!(
            "{SELECT_SONG}
             WHERE ($2::TEXT IS NULL OR s.status = $2)
             ORDER BY s.submitted_at DESC, s.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, SongSuggestion>(&query)
            .bind(viewer)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        viewer: Option<DbId>,
    ) -> Result<Option<SongSuggestion>, sqlx::Error> {
        let query = format!("{SELECT_SONG} WHERE s.id = $2");
        sqlx::query_as::<_, SongSuggestion>(&query)
            .bind(viewer)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a pending suggestion.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSongSuggestion,
    ) -> Result<SongSuggestion, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO song_suggestions (user_id, title, link, slot, note)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(input.title.trim())
        .bind(input.link.trim())
        .bind(&input.slot)
        .bind(&input.note)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id, Some(user_id))
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Change moderation status. Returns `None` if the suggestion is missing.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        viewer: DbId,
    ) -> Result<Option<SongSuggestion>, sqlx::Error> {
        let updated: Option<DbId> =
            sqlx::query_scalar("UPDATE song_suggestions SET status = $2 WHERE id = $1 RETURNING id")
                .bind(id)
                .bind(status)
                .fetch_optional(pool)
                .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id, Some(viewer)).await,
            None => Ok(None),
        }
    }

    /// Add the user's vote and increment the counter atomically.
    pub async fn vote(pool: &PgPool, id: DbId, user_id: DbId) -> Result<VoteChange, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM song_suggestions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(VoteChange::ItemMissing);
        }

        let inserted = sqlx::query(
            "INSERT INTO song_suggestion_votes (suggestion_id, user_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Ok(VoteChange::Unchanged);
        }

        let votes: i32 = sqlx::query_scalar(
            "UPDATE song_suggestions SET votes = votes + 1 WHERE id = $1 RETURNING votes",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(VoteChange::Applied { votes })
    }

    /// Remove the user's vote and decrement the counter atomically.
    pub async fn unvote(pool: &PgPool, id: DbId, user_id: DbId) -> Result<VoteChange, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM song_suggestions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(VoteChange::ItemMissing);
        }

        let deleted =
            sqlx::query("DELETE FROM song_suggestion_votes WHERE suggestion_id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        if deleted.rows_affected() == 0 {
            return Ok(VoteChange::Unchanged);
        }

        let votes: i32 = sqlx::query_scalar(
            "UPDATE song_suggestions SET votes = GREATEST(votes - 1, 0) WHERE id = $1 RETURNING votes",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(VoteChange::Applied { votes })
    }

    /// Delete every listed suggestion. Unknown IDs are skipped.
    pub async fn bulk_delete(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM song_suggestions WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
