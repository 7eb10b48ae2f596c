//! Repository for the `contact_submissions` table.

use sqlx::PgPool;
use schoolhub_core::types::DbId;

use crate::models::contact::{ContactSubmission, CreateContactSubmission};

const COLUMNS: &str = "id, user_id, name, email, message, submitted_at";

pub struct ContactRepo;

impl ContactRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: Option<DbId>,
        input: &CreateContactSubmission,
    ) -> Result<ContactSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_submissions (user_id, name, email, message)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// Submissions newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contact_submissions
             ORDER BY submitted_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
