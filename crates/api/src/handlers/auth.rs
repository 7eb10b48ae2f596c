//! Handlers for the `/auth` resource (register, token, refresh, logout,
//! password change).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use schoolhub_core::accounts::{
    validate_class_name, validate_email, validate_password_confirmation,
    validate_password_strength, validate_person_name, validate_username,
};
use schoolhub_core::consent::client_ip;
use schoolhub_core::error::CoreError;
use schoolhub_core::roles::DEFAULT_ROLE;
use schoolhub_core::settings::Feature;
use schoolhub_core::types::DbId;
use schoolhub_db::models::session::CreateSession;
use schoolhub_db::models::user::{CreateUser, User, UserResponse};
use schoolhub_db::repositories::{ProfileRepo, RoleRepo, SessionRepo, UserRepo};

use super::invalid;
use super::settings::require_feature;
use crate::auth::jwt::{sign_access_token, RefreshToken};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

/// Longest `User-Agent` stored with a session.
const MAX_USER_AGENT_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password2: String,
    pub class_name: Option<String>,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/token/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Successful authentication response returned by token and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a student account with an (optionally classed) profile. Requires
/// the user registration feature.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    require_feature(&state, Feature::UserRegistration).await?;

    let username = input.username.trim();
    let email = input.email.trim();
    validate_username(username).map_err(invalid)?;
    validate_email(email).map_err(invalid)?;
    validate_person_name("First name", &input.first_name).map_err(invalid)?;
    validate_person_name("Last name", &input.last_name).map_err(invalid)?;
    validate_password_confirmation(&input.password, &input.password2).map_err(invalid)?;
    validate_password_strength(&input.password, username).map_err(invalid)?;
    let class_name = input
        .class_name
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if let Some(class_name) = class_name {
        validate_class_name(class_name).map_err(invalid)?;
    }

    let role = RoleRepo::find_by_name(&state.pool, DEFAULT_ROLE)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{DEFAULT_ROLE}' is not seeded")))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create_with_profile(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            password_hash,
            role_id: role.id,
        },
    )
    .await?;

    if class_name.is_some() {
        ProfileRepo::set_class_name(&state.pool, user.id, class_name).await?;
    }

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_user(&user, role.name)),
    ))
}

/// POST /api/v1/auth/token
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        if user.failed_login_count + 1 >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let refresh = RefreshToken::generate();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh.hash,
            expires_at: state.config.jwt.refresh_expires_at(Utc::now()),
            user_agent: header("user-agent").map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect()),
            ip_address: client_ip(header("x-forwarded-for"), header("x-real-ip")),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %role_name, "User logged in");
    let response = auth_response(&state, &user, role_name, refresh.plaintext)?;
    Ok(Json(response))
}

/// POST /api/v1/auth/token/refresh
///
/// Exchange a valid refresh token for a new token pair. The presented token
/// is revoked as the new one is stored, so each refresh token works once.
/// Tokens of deactivated accounts are refused.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let next = RefreshToken::generate();
    let session = SessionRepo::rotate(
        &state.pool,
        &RefreshToken::digest(&input.refresh_token),
        &next.hash,
        state.config.jwt.refresh_expires_at(Utc::now()),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    let response = auth_response(&state, &user, role_name, next.plaintext)?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/change-password
///
/// Verify the current password, store the new one, and revoke every
/// session so other devices must log in again.
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    let current_valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(invalid("Current password is incorrect".to_string()));
    }

    validate_password_confirmation(&input.new_password, &input.new_password_confirm)
        .map_err(invalid)?;
    validate_password_strength(&input.new_password, &user.username).map_err(invalid)?;

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign an access token and pair it with the already-stored refresh token.
fn auth_response(
    state: &AppState,
    user: &User,
    role: String,
    refresh_token: String,
) -> AppResult<AuthResponse> {
    let access_token = sign_access_token(user.id, &role, &state.config.jwt, Utc::now())
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: UserInfo {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role,
        },
    })
}
