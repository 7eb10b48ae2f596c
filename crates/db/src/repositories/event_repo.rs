//! Repository for the `events` table.

use sqlx::PgPool;
use schoolhub_core::types::{DbId, Timestamp};

use crate::models::event::{CreateEvent, Event, UpdateEvent};

const COLUMNS: &str = "id, title, description, location, starts_at, ends_at, created_at";

pub struct EventRepo;

impl EventRepo {
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (title, description, location, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .fetch_one(pool)
            .await
    }

    /// Events that have not finished yet, soonest first. An event without an
    /// end time counts as finished once it has started.
    pub async fn list_upcoming(pool: &PgPool, now: Timestamp) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE COALESCE(ends_at, starts_at) >= $1
             ORDER BY starts_at ASC, id ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Partial update. `location` and `ends_at` are cleared by an explicit null.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = CASE WHEN $4 THEN $5 ELSE location END,
                starts_at = COALESCE($6, starts_at),
                ends_at = CASE WHEN $7 THEN $8 ELSE ends_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.location.is_some())
            .bind(input.location.as_ref().and_then(|v| v.as_deref()))
            .bind(input.starts_at)
            .bind(input.ends_at.is_some())
            .bind(input.ends_at.flatten())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
