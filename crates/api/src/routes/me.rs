//! Route definitions for the `/me` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET  /          -> get_me
/// GET  /profile   -> get_profile
/// PUT  /profile   -> update_profile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me::get_me))
        .route("/profile", get(me::get_profile).put(me::update_profile))
}
