//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement. Finer-grained checks go through [`require_permission`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use schoolhub_core::error::CoreError;
use schoolhub_core::roles::{has_permission, is_staff, Permission};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a staff role (`admin`, `editor`, `moderator` or `author`).
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_staff(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Staff role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}

/// Reject with 403 unless `user` carries `permission`.
pub fn require_permission(user: &AuthUser, permission: Permission) -> Result<(), AppError> {
    if has_permission(&user.role, permission) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(format!(
            "Missing permission: {}",
            permission.codename()
        ))))
    }
}
