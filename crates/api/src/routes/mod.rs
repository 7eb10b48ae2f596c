pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod health;
pub mod me;
pub mod memes;
pub mod poll;
pub mod posts;
pub mod site;
pub mod songs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (feature-gated)
/// /auth/token                                      obtain token pair
/// /auth/token/refresh                              rotate refresh token
/// /auth/logout                                     revoke sessions (auth)
/// /auth/change-password                            change password (auth)
///
/// /me                                              account + permissions (auth)
/// /me/profile                                      get, update class (auth)
///
/// /categories                                      list
/// /posts                                           public feed
/// /posts/{id}                                      public post
/// /posts/{id}/comments                             list, create (auth)
/// /comments/{id}                                   delete (owner or moderator)
///
/// /poll/status                                     weekly status (auth)
/// /poll/answer                                     answer (auth)
/// /poll/statistics                                 leaderboard, participants
///
/// /songs                                           list, suggest (auth)
/// /songs/{id}/vote                                 vote, unvote (auth)
/// /memes                                           list, upload (auth)
/// /memes/{id}/vote                                 vote, unvote (auth)
///
/// /settings                                        feature flags
/// /notifications                                   enabled notifications
/// /events                                          upcoming events
/// /changelog                                       latest changelog
/// /legal/terms, /legal/privacy                     latest legal documents
/// /contact                                         submit contact form
/// /consent                                         record cookie consent
///
/// /admin/users[/{id}[/role]]                       user management
/// /admin/posts/...                                 scoped post management
/// /admin/categories[/{id}]                         category management
/// /admin/comments[/{id}]                           comment moderation
/// /admin/polls/...                                 poll management
/// /admin/songs/...                                 suggestion moderation
/// /admin/memes/...                                 meme moderation
/// /admin/settings                                  update feature flags
/// /admin/notifications[/{id}]                      notification management
/// /admin/events[/{id}]                             event management
/// /admin/changelog                                 save changelog
/// /admin/legal/terms, /admin/legal/privacy         publish legal documents
/// /admin/contact, /admin/consent                   submissions and records
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and the caller's own account.
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        // Blog.
        .nest("/categories", categories::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        // Community features (each gated by a site setting).
        .nest("/poll", poll::router())
        .nest("/songs", songs::router())
        .nest("/memes", memes::router())
        // Settings, notifications, events, legal, contact, consent.
        .merge(site::router())
        // Staff surface.
        .nest("/admin", admin::router())
}
