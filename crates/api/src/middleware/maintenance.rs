//! Maintenance-mode gate for the `/api/v1` tree.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use schoolhub_core::roles::is_superuser;
use schoolhub_core::settings::is_maintenance_exempt;
use schoolhub_db::repositories::SiteSettingsRepo;

use super::auth::claims_from_parts;
use crate::error::AppError;
use crate::state::AppState;

/// Prefix stripped before matching exempt paths, for requests that reach
/// this layer with the full URI.
const API_PREFIX: &str = "/api/v1";

/// Return 503 `MAINTENANCE` while maintenance mode is on.
///
/// Auth, settings, and admin paths stay reachable, and admins pass through
/// everywhere so they can switch maintenance off again.
pub async fn maintenance_guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    let path = path.strip_prefix(API_PREFIX).unwrap_or(path);
    if is_maintenance_exempt(path) {
        return next.run(req).await;
    }

    let settings = match SiteSettingsRepo::get(&state.pool).await {
        Ok(settings) => settings,
        Err(e) => return AppError::Database(e).into_response(),
    };
    if !settings.maintenance_mode {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let is_admin = claims_from_parts(&parts, &state.config.jwt)
        .map(|claims| is_superuser(&claims.role))
        .unwrap_or(false);
    if is_admin {
        return next.run(Request::from_parts(parts, body)).await;
    }

    tracing::debug!(path = %parts.uri.path(), "Rejected request during maintenance");
    AppError::Maintenance.into_response()
}
