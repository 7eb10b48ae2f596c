//! Site settings singleton model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::settings::FeatureFlags;
use schoolhub_core::types::Timestamp;

/// The single row of the `site_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSettings {
    pub maintenance_mode: bool,
    pub enable_bell_suggestions: bool,
    pub enable_weekly_poll: bool,
    pub enable_meme_of_the_week: bool,
    pub enable_user_registration: bool,
    pub enable_program_page: bool,
    pub updated_at: Timestamp,
}

impl SiteSettings {
    pub fn flags(&self) -> FeatureFlags {
        FeatureFlags {
            maintenance_mode: self.maintenance_mode,
            bell_suggestions: self.enable_bell_suggestions,
            weekly_poll: self.enable_weekly_poll,
            meme_of_the_week: self.enable_meme_of_the_week,
            user_registration: self.enable_user_registration,
            program_page: self.enable_program_page,
        }
    }
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSiteSettings {
    pub maintenance_mode: Option<bool>,
    pub enable_bell_suggestions: Option<bool>,
    pub enable_weekly_poll: Option<bool>,
    pub enable_meme_of_the_week: Option<bool>,
    pub enable_user_registration: Option<bool>,
    pub enable_program_page: Option<bool>,
}
