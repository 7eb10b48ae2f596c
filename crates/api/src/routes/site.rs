//! Route definitions for site-wide content: settings, notifications,
//! events, the changelog, legal documents, contact and consent.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{consent, contact, content, settings};
use crate::state::AppState;

/// Public routes merged at the `/api/v1` root.
///
/// ```text
/// GET   /settings        -> settings::get_settings
/// GET   /notifications   -> list_notifications
/// GET   /events          -> list_events
/// GET   /changelog       -> get_changelog
/// GET   /legal/terms     -> get_terms
/// GET   /legal/privacy   -> get_privacy
/// POST  /contact         -> contact::submit
/// POST  /consent         -> consent::record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(settings::get_settings))
        .route("/notifications", get(content::list_notifications))
        .route("/events", get(content::list_events))
        .route("/changelog", get(content::get_changelog))
        .route("/legal/terms", get(content::get_terms))
        .route("/legal/privacy", get(content::get_privacy))
        .route("/contact", post(contact::submit))
        .route("/consent", post(consent::record))
}

/// Admin routes merged into `/admin` (require `manage_site`).
///
/// ```text
/// PUT     /settings              -> settings::update_settings
/// GET     /notifications         -> admin_list_notifications
/// POST    /notifications         -> create_notification
/// PUT     /notifications/{id}    -> update_notification
/// DELETE  /notifications/{id}    -> delete_notification
/// POST    /events                -> create_event
/// PUT     /events/{id}           -> update_event
/// DELETE  /events/{id}           -> delete_event
/// PUT     /changelog             -> save_changelog
/// POST    /legal/terms           -> publish_terms
/// POST    /legal/privacy         -> publish_privacy
/// GET     /contact               -> contact::admin_list
/// GET     /consent               -> consent::admin_list
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/settings", put(settings::update_settings))
        .route(
            "/notifications",
            get(content::admin_list_notifications).post(content::create_notification),
        )
        .route(
            "/notifications/{id}",
            put(content::update_notification).delete(content::delete_notification),
        )
        .route("/events", post(content::create_event))
        .route(
            "/events/{id}",
            put(content::update_event).delete(content::delete_event),
        )
        .route("/changelog", put(content::save_changelog))
        .route("/legal/terms", post(content::publish_terms))
        .route("/legal/privacy", post(content::publish_privacy))
        .route("/contact", get(contact::admin_list))
        .route("/consent", get(consent::admin_list))
}
