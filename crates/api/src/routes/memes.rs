//! Route definitions for memes.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::memes;
use crate::state::AppState;

/// Routes mounted at `/memes`. Gated on the meme of the week feature.
///
/// ```text
/// GET     /            -> list
/// POST    /            -> upload (multipart, requires auth)
/// POST    /{id}/vote   -> vote (requires auth)
/// DELETE  /{id}/vote   -> unvote (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(memes::list).post(memes::upload))
        .route("/{id}/vote", post(memes::vote).delete(memes::unvote))
}

/// Routes mounted at `/admin/memes` (requires `moderate_media`).
///
/// ```text
/// GET   /                -> admin_list
/// PUT   /{id}/approval   -> admin_set_approval
/// POST  /bulk-delete     -> admin_bulk_delete
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(memes::admin_list))
        .route("/{id}/approval", put(memes::admin_set_approval))
        .route("/bulk-delete", post(memes::admin_bulk_delete))
}
