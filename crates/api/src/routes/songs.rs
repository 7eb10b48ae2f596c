//! Route definitions for bell song suggestions.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::songs;
use crate::state::AppState;

/// Routes mounted at `/songs`. Gated on the bell suggestions feature.
///
/// ```text
/// GET     /            -> list
/// POST    /            -> create (requires auth)
/// POST    /{id}/vote   -> vote (requires auth)
/// DELETE  /{id}/vote   -> unvote (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(songs::list).post(songs::create))
        .route("/{id}/vote", post(songs::vote).delete(songs::unvote))
}

/// Routes mounted at `/admin/songs` (requires `moderate_media`).
///
/// ```text
/// GET   /              -> admin_list
/// PUT   /{id}/status   -> admin_set_status
/// POST  /bulk-delete   -> admin_bulk_delete
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(songs::admin_list))
        .route("/{id}/status", put(songs::admin_set_status))
        .route("/bulk-delete", post(songs::admin_bulk_delete))
}
