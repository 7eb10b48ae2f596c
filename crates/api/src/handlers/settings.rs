//! Handlers for the site settings singleton, plus the feature gate used by
//! other handlers.

use axum::extract::State;
use axum::Json;
use schoolhub_core::roles::Permission;
use schoolhub_core::settings::Feature;
use schoolhub_db::models::site_settings::{SiteSettings, UpdateSiteSettings};
use schoolhub_db::repositories::SiteSettingsRepo;

use crate::error::AppResult;
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::state::AppState;

/// Fail with 403 `FEATURE_DISABLED` unless `feature` is switched on.
pub async fn require_feature(state: &AppState, feature: Feature) -> AppResult<()> {
    let settings = SiteSettingsRepo::get(&state.pool).await?;
    settings.flags().require(feature)?;
    Ok(())
}

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<SiteSettings>> {
    let settings = SiteSettingsRepo::get(&state.pool).await?;
    Ok(Json(settings))
}

/// PUT /api/v1/admin/settings
///
/// Partial update; omitted flags keep their current value.
pub async fn update_settings(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<UpdateSiteSettings>,
) -> AppResult<Json<SiteSettings>> {
    require_permission(&user, Permission::ManageSite)?;

    let settings = SiteSettingsRepo::update(&state.pool, &input).await?;
    tracing::info!(
        user_id = user.user_id,
        maintenance_mode = settings.maintenance_mode,
        "Site settings updated",
    );
    Ok(Json(settings))
}
