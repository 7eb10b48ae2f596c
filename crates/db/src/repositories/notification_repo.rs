//! Repository for the `notifications` table.

use sqlx::PgPool;
use schoolhub_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification, UpdateNotification};

const COLUMNS: &str = "id, text, enabled, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (text, enabled) VALUES ($1, COALESCE($2, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(&input.text)
            .bind(input.enabled)
            .fetch_one(pool)
            .await
    }

    /// Enabled notifications, newest first.
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications WHERE enabled ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Notification>(&query).fetch_all(pool).await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Notification>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM notifications ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Notification>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateNotification,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET
                text = COALESCE($2, text),
                enabled = COALESCE($3, enabled)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(&input.text)
            .bind(input.enabled)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
