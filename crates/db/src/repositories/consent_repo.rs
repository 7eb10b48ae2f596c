//! Repository for the `consent_records` table.

use sqlx::PgPool;
use schoolhub_core::consent::DEFAULT_POLICY_VERSION;
use schoolhub_core::types::DbId;

use crate::models::consent::{ConsentRecord, CreateConsentRecord};

const COLUMNS: &str = "id, user_id, ip_address, consent_status, policy_version, \
                       analytical_accepted, marketing_accepted, timestamp";

pub struct ConsentRepo;

impl ConsentRepo {
    /// Append a consent record. Records are never updated.
    pub async fn create(
        pool: &PgPool,
        user_id: Option<DbId>,
        ip_address: Option<&str>,
        input: &CreateConsentRecord,
    ) -> Result<ConsentRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO consent_records
                (user_id, ip_address, consent_status, policy_version,
                 analytical_accepted, marketing_accepted)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConsentRecord>(&query)
            .bind(user_id)
            .bind(ip_address)
            .bind(&input.consent_status)
            .bind(
                input
                    .policy_version
                    .as_deref()
                    .unwrap_or(DEFAULT_POLICY_VERSION),
            )
            .bind(input.analytical_accepted)
            .bind(input.marketing_accepted)
            .fetch_one(pool)
            .await
    }

    /// Records newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConsentRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM consent_records
             WHERE ($1::TEXT IS NULL OR consent_status = $1)
             ORDER BY timestamp DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ConsentRecord>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
