//! `GET /health`: liveness for load balancers and the status page.
//!
//! Reports the database and the upload directory separately. The service is
//! `ok` only when both are usable; `maintenance_mode` is informational and
//! `null` when the settings row cannot be read.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use schoolhub_db::repositories::SiteSettingsRepo;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether `MEDIA_ROOT` exists and is a directory.
    pub media_healthy: bool,
    pub maintenance_mode: Option<bool>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = schoolhub_db::health_check(&state.pool).await.is_ok();
    let media_healthy = tokio::fs::metadata(&state.config.media_root)
        .await
        .is_ok_and(|m| m.is_dir());
    let maintenance_mode = if db_healthy {
        SiteSettingsRepo::get(&state.pool)
            .await
            .ok()
            .map(|s| s.maintenance_mode)
    } else {
        None
    };

    if !media_healthy {
        tracing::warn!(media_root = %state.config.media_root.display(), "Media root is not usable");
    }

    Json(HealthResponse {
        status: if db_healthy && media_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        media_healthy,
        maintenance_mode,
    })
}

/// Mounted at the root, outside `/api/v1` and the maintenance guard.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
