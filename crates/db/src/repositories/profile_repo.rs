//! Repository for the `user_profiles` table.

use sqlx::PgPool;
use schoolhub_core::types::DbId;

use crate::models::profile::UserProfile;

const COLUMNS: &str = "id, user_id, class_name, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    /// Fetch a user's profile, creating an empty one if it does not exist yet.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<UserProfile, sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Set (or clear) the class of a user's profile.
    pub async fn set_class_name(
        pool: &PgPool,
        user_id: DbId,
        class_name: Option<&str>,
    ) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles (user_id, class_name) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET class_name = EXCLUDED.class_name
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(class_name)
            .fetch_one(pool)
            .await
    }
}
