//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, put};
use axum::Router;

use super::{categories, comments, memes, poll, posts, site, songs};
use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Every handler checks the caller's role or permission through its
/// extractors. User management lives here; each resource contributes its
/// own admin sub-router.
///
/// ```text
/// GET     /users              -> users::list
/// PUT     /users/{id}/role    -> users::set_role
/// DELETE  /users/{id}         -> users::deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list))
        .route("/users/{id}", delete(users::deactivate))
        .route("/users/{id}/role", put(users::set_role))
        .nest("/posts", posts::admin_router())
        .nest("/categories", categories::admin_router())
        .nest("/comments", comments::admin_router())
        .nest("/polls", poll::admin_router())
        .nest("/songs", songs::admin_router())
        .nest("/memes", memes::admin_router())
        .merge(site::admin_router())
}
