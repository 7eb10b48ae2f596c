//! Route definitions for comments outside a post context.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// DELETE  /{id}   -> delete (owner or moderate_comments)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(comments::delete))
}

/// Routes mounted at `/admin/comments` (requires `moderate_comments`).
///
/// ```text
/// GET     /       -> admin_list
/// DELETE  /{id}   -> admin_delete
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(comments::admin_list))
        .route("/{id}", delete(comments::admin_delete))
}
