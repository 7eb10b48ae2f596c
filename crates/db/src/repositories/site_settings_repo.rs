//! Repository for the `site_settings` singleton row.

use sqlx::PgPool;

use crate::models::site_settings::{SiteSettings, UpdateSiteSettings};

const COLUMNS: &str = "maintenance_mode, enable_bell_suggestions, enable_weekly_poll, \
                       enable_meme_of_the_week, enable_user_registration, enable_program_page, \
                       updated_at";

/// Reads and updates the settings row (`id = 1`).
pub struct SiteSettingsRepo;

impl SiteSettingsRepo {
    /// Load the settings, creating the default row if it was removed.
    pub async fn get(pool: &PgPool) -> Result<SiteSettings, sqlx::Error> {
        sqlx::query("INSERT INTO site_settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM site_settings WHERE id = 1");
        sqlx::query_as::<_, SiteSettings>(&query)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update; absent fields keep their value.
    pub async fn update(
        pool: &PgPool,
        input: &UpdateSiteSettings,
    ) -> Result<SiteSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO site_settings (id) VALUES (1) ON CONFLICT (id) DO UPDATE SET
                maintenance_mode = COALESCE($1, site_settings.maintenance_mode),
                enable_bell_suggestions = COALESCE($2, site_settings.enable_bell_suggestions),
                enable_weekly_poll = COALESCE($3, site_settings.enable_weekly_poll),
                enable_meme_of_the_week = COALESCE($4, site_settings.enable_meme_of_the_week),
                enable_user_registration = COALESCE($5, site_settings.enable_user_registration),
                enable_program_page = COALESCE($6, site_settings.enable_program_page)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SiteSettings>(&query)
            .bind(input.maintenance_mode)
            .bind(input.enable_bell_suggestions)
            .bind(input.enable_weekly_poll)
            .bind(input.enable_meme_of_the_week)
            .bind(input.enable_user_registration)
            .bind(input.enable_program_page)
            .fetch_one(pool)
            .await
    }
}
