//! Request handlers.
//!
//! Each submodule holds the async handlers for one resource, public and
//! admin variants side by side. Handlers validate input with
//! `schoolhub_core`, delegate persistence to the repositories in
//! `schoolhub_db`, and map failures via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod categories;
pub mod comments;
pub mod consent;
pub mod contact;
pub mod content;
pub mod me;
pub mod memes;
pub mod poll;
pub mod posts;
pub mod settings;
pub mod songs;
pub mod uploads;
pub mod users;

use schoolhub_core::error::CoreError;

use crate::error::AppError;

/// Wrap a core validation message as a 400 response.
pub(crate) fn invalid(msg: String) -> AppError {
    AppError::Core(CoreError::Validation(msg))
}
