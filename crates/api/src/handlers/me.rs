//! Handlers for the signed-in user's own account (`/me`).

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use schoolhub_core::accounts::validate_class_name;
use schoolhub_core::error::CoreError;
use schoolhub_core::roles::permissions_for;
use schoolhub_db::models::profile::{UpdateProfile, UserProfile};
use schoolhub_db::models::user::UserResponse;
use schoolhub_db::repositories::{ProfileRepo, RoleRepo, UserRepo};

use super::invalid;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Account details plus the caller's class and permission codenames.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub class_name: Option<String>,
    pub permissions: Vec<&'static str>,
}

/// GET /api/v1/me
pub async fn get_me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let profile = ProfileRepo::get_or_create(&state.pool, user.id).await?;

    let permissions = permissions_for(&role)
        .into_iter()
        .map(|p| p.codename())
        .collect();

    Ok(Json(MeResponse {
        user: UserResponse::from_user(&user, role),
        class_name: profile.class_name,
        permissions,
    }))
}

/// GET /api/v1/me/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserProfile>> {
    let profile = ProfileRepo::get_or_create(&state.pool, auth.user_id).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/me/profile
///
/// Set or clear (`null`/empty) the caller's class.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<UserProfile>> {
    let class_name = input
        .class_name
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if let Some(class_name) = class_name {
        validate_class_name(class_name).map_err(invalid)?;
    }

    let profile = ProfileRepo::set_class_name(&state.pool, auth.user_id, class_name).await?;
    Ok(Json(profile))
}
