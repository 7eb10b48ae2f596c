//! Route definitions for categories.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET  /   -> list
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(categories::list))
}

/// Routes mounted at `/admin/categories` (requires `manage_site`).
///
/// ```text
/// POST    /       -> create
/// PUT     /{id}   -> update
/// DELETE  /{id}   -> delete
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(categories::create))
        .route("/{id}", put(categories::update).delete(categories::delete))
}
