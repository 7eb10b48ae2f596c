//! Admin handlers for user accounts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use schoolhub_core::error::CoreError;
use schoolhub_core::roles::{validate_role, Permission};
use schoolhub_core::types::DbId;
use schoolhub_db::models::user::UserResponse;
use schoolhub_db::repositories::{RoleRepo, SessionRepo, UserRepo};

use super::invalid;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// GET /api/v1/admin/users
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    require_permission(&admin, Permission::ManageSite)?;
    let (limit, offset) = page.resolve();
    let users = UserRepo::list(&state.pool, limit, offset).await?;

    let roles = RoleRepo::list(&state.pool).await?;
    let data = users
        .iter()
        .map(|u| {
            let role = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role)
        })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// The new role is carried by tokens issued after the change.
pub async fn set_role(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    require_permission(&admin, Permission::ManageSite)?;
    validate_role(&input.role).map_err(invalid)?;

    let role = RoleRepo::find_by_name(&state.pool, &input.role)
        .await?
        .ok_or_else(|| invalid(format!("Role '{}' does not exist", input.role)))?;
    let user = UserRepo::set_role(&state.pool, id, role.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, role = %role.name, admin_id = admin.user_id, "User role changed");
    Ok(Json(UserResponse::from_user(&user, role.name)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Deactivates the account and revokes its sessions. Admins cannot
/// deactivate themselves.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&admin, Permission::ManageSite)?;
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }

    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, admin_id = admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
