//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- the user identified by a Bearer access token.
//! - [`auth::OptionalAuthUser`] -- the same, or anonymous.
//! - [`rbac::RequireStaff`] -- role gate for `/admin`; permissions are checked per handler.
//! - [`maintenance::maintenance_guard`] -- 503 for non-admins in maintenance mode.

pub mod auth;
pub mod maintenance;
pub mod rbac;
