//! Repository for the `user_sessions` table.
//!
//! A session is one refresh-token lineage opened at login. Refreshing rotates
//! the token inside the same statement that revokes the old one, so a token
//! can be exchanged at most once.

use sqlx::PgPool;
use schoolhub_core::types::{DbId, Timestamp};

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, \
                       user_agent, ip_address, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    /// Open a session at login.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Exchange a presented refresh token for a new one.
    ///
    /// The presented session must be live (not revoked, not expired) and its
    /// user active. It is revoked and a successor carrying the same client
    /// details is inserted in one statement. Returns `None` when the token is
    /// unknown, stale, already used, or belongs to a deactivated account.
    pub async fn rotate(
        pool: &PgPool,
        presented_hash: &str,
        next_hash: &str,
        next_expires_at: Timestamp,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "WITH used AS (
                UPDATE user_sessions s SET is_revoked = true
                FROM users u
                WHERE u.id = s.user_id
                  AND u.is_active
                  AND s.refresh_token_hash = $1
                  AND NOT s.is_revoked
                  AND s.expires_at > NOW()
                RETURNING s.user_id, s.user_agent, s.ip_address
             )
             INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent, ip_address)
             SELECT user_id, $2, $3, user_agent, ip_address FROM used
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(presented_hash)
            .bind(next_hash)
            .bind(next_expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Revoke every live session of a user (logout, password change,
    /// deactivation). Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that can no longer be refreshed as of `now`.
    pub async fn cleanup_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE expires_at <= $1 OR is_revoked")
                .bind(now)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
