//! Route definitions for the weekly poll.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::poll;
use crate::state::AppState;

/// Routes mounted at `/poll`. All are gated on the weekly poll feature.
///
/// ```text
/// GET   /status       -> status (requires auth)
/// POST  /answer       -> answer (requires auth)
/// GET   /statistics   -> statistics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(poll::status))
        .route("/answer", post(poll::answer))
        .route("/statistics", get(poll::statistics))
}

/// Routes mounted at `/admin/polls` (requires `manage_polls`).
///
/// ```text
/// GET     /              -> admin_list
/// POST    /              -> admin_create
/// GET     /{id}          -> admin_get
/// PUT     /{id}          -> admin_update
/// DELETE  /{id}          -> admin_delete
/// POST    /bulk-delete   -> admin_bulk_delete
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(poll::admin_list).post(poll::admin_create))
        .route("/bulk-delete", post(poll::admin_bulk_delete))
        .route(
            "/{id}",
            get(poll::admin_get)
                .put(poll::admin_update)
                .delete(poll::admin_delete),
        )
}
