//! Domain rules for the SchoolHub content backend.
//!
//! Everything here is pure: no database, no HTTP. The `db` and `api` crates
//! call into these modules before they read or write anything.

pub mod accounts;
pub mod comments;
pub mod consent;
pub mod contact;
pub mod error;
pub mod markdown;
pub mod media;
pub mod polls;
pub mod posts;
pub mod roles;
pub mod search;
pub mod settings;
pub mod types;
