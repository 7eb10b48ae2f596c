//! Route definitions for posts and their comments.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{comments, posts};
use crate::state::AppState;

/// Routes mounted at `/posts`.
///
/// ```text
/// GET   /                      -> list_public
/// GET   /{id}                  -> get_public
/// GET   /{id}/comments         -> comments::list_for_post
/// POST  /{id}/comments         -> comments::create (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::list_public))
        .route("/{id}", get(posts::get_public))
        .route(
            "/{id}/comments",
            get(comments::list_for_post).post(comments::create),
        )
}

/// Routes mounted at `/admin/posts`.
///
/// Staff only; visibility follows the caller's post scope.
///
/// ```text
/// GET     /                                 -> admin_list
/// POST    /                                 -> admin_create
/// GET     /{id}                             -> admin_get
/// PUT     /{id}                             -> admin_update
/// DELETE  /{id}                             -> admin_delete
/// POST    /{id}/allow                       -> admin_allow
/// POST    /{id}/images                      -> add_image (multipart)
/// DELETE  /{id}/images/{image_id}           -> remove_image
/// POST    /{id}/documents                   -> add_document (multipart)
/// DELETE  /{id}/documents/{document_id}     -> remove_document
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::admin_list).post(posts::admin_create))
        .route(
            "/{id}",
            get(posts::admin_get)
                .put(posts::admin_update)
                .delete(posts::admin_delete),
        )
        .route("/{id}/allow", post(posts::admin_allow))
        .route("/{id}/images", post(posts::add_image))
        .route("/{id}/images/{image_id}", delete(posts::remove_image))
        .route("/{id}/documents", post(posts::add_document))
        .route(
            "/{id}/documents/{document_id}",
            delete(posts::remove_document),
        )
}
