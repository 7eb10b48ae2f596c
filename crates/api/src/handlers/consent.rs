//! Handlers for cookie-consent records.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use schoolhub_core::consent::{client_ip, validate_policy_version, validate_status};
use schoolhub_core::roles::Permission;
use schoolhub_db::models::consent::{ConsentRecord, CreateConsentRecord};
use schoolhub_db::repositories::ConsentRepo;

use super::invalid;
use crate::error::AppResult;
use crate::middleware::auth::OptionalAuthUser;
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConsentQuery {
    pub status: Option<String>,
}

/// POST /api/v1/consent
///
/// Records the visitor's choice with their client address taken from the
/// proxy headers.
pub async fn record(
    State(state): State<AppState>,
    visitor: OptionalAuthUser,
    headers: HeaderMap,
    Json(input): Json<CreateConsentRecord>,
) -> AppResult<(StatusCode, Json<ConsentRecord>)> {
    validate_status(&input.consent_status).map_err(invalid)?;
    if let Some(version) = &input.policy_version {
        validate_policy_version(version).map_err(invalid)?;
    }

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let ip = client_ip(header("x-forwarded-for"), header("x-real-ip"));

    let record =
        ConsentRepo::create(&state.pool, visitor.user_id(), ip.as_deref(), &input).await?;
    tracing::debug!(consent_id = record.id, status = %record.consent_status, "Consent recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/admin/consent?status=
pub async fn admin_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(query): Query<ConsentQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ConsentRecord>>>> {
    require_permission(&user, Permission::ManageSite)?;
    if let Some(status) = &query.status {
        validate_status(status).map_err(invalid)?;
    }
    let (limit, offset) = page.resolve();
    let records = ConsentRepo::list(&state.pool, query.status.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse { data: records }))
}
