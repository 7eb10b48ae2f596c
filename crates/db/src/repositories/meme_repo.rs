//! Repository for memes and their votes.

use sqlx::PgPool;
use schoolhub_core::types::DbId;

use crate::models::meme::{CreateMeme, Meme};
use crate::models::vote::VoteChange;

/// Joined select; `$1` is the viewing user (nullable) for `has_voted`.
const SELECT_MEME: &str = "SELECT m.id, m.user_id, u.username AS user_username, m.title, \
                           m.image_path, m.is_approved, m.votes, \
                           EXISTS(SELECT 1 FROM meme_votes v \
                                  WHERE v.meme_id = m.id AND v.user_id = $1) AS has_voted, \
                           m.created_at \
                           FROM memes m \
                           JOIN users u ON u.id = m.user_id";

pub struct MemeRepo;

impl MemeRepo {
    /// Approved memes plus the viewer's own, newest first.
    pub async fn list_visible(
        pool: &PgPool,
        viewer: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Meme>, sqlx::Error> {
        let query = format!(
            "{SELECT_MEME}
             WHERE m.is_approved OR m.user_id = $1
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Meme>(&query)
            .bind(viewer)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every meme, optionally filtered by approval, for moderation.
    pub async fn list_all(
        pool: &PgPool,
        viewer: DbId,
        is_approved: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Meme>, sqlx::Error> {
        let query = format!(
            "{SELECT_MEME}
             WHERE ($2::BOOLEAN IS NULL OR m.is_approved = $2)
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Meme>(&query)
            .bind(viewer)
            .bind(is_approved)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        viewer: Option<DbId>,
    ) -> Result<Option<Meme>, sqlx::Error> {
        let query = format!("{SELECT_MEME} WHERE m.id = $2");
        sqlx::query_as::<_, Meme>(&query)
            .bind(viewer)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateMeme) -> Result<Meme, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO memes (user_id, title, image_path) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(input.user_id)
        .bind(&input.title)
        .bind(&input.image_path)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id, Some(input.user_id))
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Approve or hide a meme. Returns `None` if it does not exist.
    pub async fn set_approval(
        pool: &PgPool,
        id: DbId,
        is_approved: bool,
        viewer: DbId,
    ) -> Result<Option<Meme>, sqlx::Error> {
        let updated: Option<DbId> =
            sqlx::query_scalar("UPDATE memes SET is_approved = $2 WHERE id = $1 RETURNING id")
                .bind(id)
                .bind(is_approved)
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

        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM memes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(VoteChange::ItemMissing);
        }

        let inserted = sqlx::query(
            "INSERT INTO meme_votes (meme_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Ok(VoteChange::Unchanged);
        }

        let votes: i32 =
            sqlx::query_scalar("UPDATE memes SET votes = votes + 1 WHERE id = $1 RETURNING votes")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(VoteChange::Applied { votes })
    }

    /// Remove the user's vote and decrement the counter atomically.
    pub async fn unvote(pool: &PgPool, id: DbId, user_id: DbId) -> Result<VoteChange, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM memes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(VoteChange::ItemMissing);
        }

        let deleted = sqlx::query("DELETE FROM meme_votes WHERE meme_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Ok(VoteChange::Unchanged);
        }

        let votes: i32 = sqlx::query_scalar(
            "UPDATE memes SET votes = GREATEST(votes - 1, 0) WHERE id = $1 RETURNING votes",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(VoteChange::Applied { votes })
    }

    /// Delete every listed meme, returning the stored image paths so the
    /// caller can remove the files. Unknown IDs are skipped.
    pub async fn bulk_delete(pool: &PgPool, ids: &[DbId]) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("DELETE FROM memes WHERE id = ANY($1) RETURNING image_path")
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
