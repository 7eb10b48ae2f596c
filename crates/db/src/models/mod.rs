//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

use serde::{Deserialize, Deserializer};

pub mod category;
pub mod comment;
pub mod consent;
pub mod contact;
pub mod content;
pub mod event;
pub mod meme;
pub mod notification;
pub mod poll;
pub mod post;
pub mod profile;
pub mod role;
pub mod session;
pub mod site_settings;
pub mod song;
pub mod user;
pub mod vote;

/// Deserialize a nullable column in an update DTO.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>` field: a missing field stays `None` (keep the column),
/// an explicit `null` becomes `Some(None)` (clear it).
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
