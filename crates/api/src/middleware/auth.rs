//! JWT-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use schoolhub_core::error::CoreError;
use schoolhub_core::types::DbId;
use schoolhub_db::repositories::UserRepo;

use crate::auth::jwt::{decode_access_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// The account is re-checked on every request, so deactivation takes effect
/// before the access token expires. The role is the one signed into the token.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's role name (e.g. `"admin"`, `"student"`).
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Read the raw token from `Authorization: Bearer <token>`.
///
/// `Ok(None)` when the header is absent; an error when it is malformed.
pub fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization header".into(),
        ))
    })?;
    value.strip_prefix("Bearer ").map(Some).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}

/// Decode the caller's claims, if a valid token is present.
pub fn claims_from_parts(parts: &Parts, jwt: &JwtConfig) -> Option<Claims> {
    let token = bearer_token(parts).ok().flatten()?;
    decode_access_token(token, jwt).ok()
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

        let claims = decode_access_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if !UserRepo::is_active(&state.pool, claims.sub).await? {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Account is no longer active".into(),
            )));
        }

        Ok(claims.into())
    }
}

/// The caller if they sent a valid token, otherwise anonymous.
///
/// Public endpoints use this to personalise responses (e.g. `has_voted`)
/// without requiring a login. An expired or malformed token, or one belonging
/// to a deactivated account, is treated as anonymous.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn user_id(&self) -> Option<DbId> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(claims) = claims_from_parts(parts, &state.config.jwt) else {
            return Ok(OptionalAuthUser(None));
        };
        let active = UserRepo::is_active(&state.pool, claims.sub).await?;
        Ok(OptionalAuthUser(active.then(|| claims.into())))
    }
}
