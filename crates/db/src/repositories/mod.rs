//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod comment_repo;
pub mod consent_repo;
pub mod contact_repo;
pub mod content_repo;
pub mod event_repo;
pub mod meme_repo;
pub mod notification_repo;
pub mod poll_repo;
pub mod post_repo;
pub mod profile_repo;
pub mod role_repo;
pub mod session_repo;
pub mod site_settings_repo;
pub mod song_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use consent_repo::ConsentRepo;
pub use contact_repo::ContactRepo;
pub use content_repo::ContentRepo;
pub use event_repo::EventRepo;
pub use meme_repo::MemeRepo;
pub use notification_repo::NotificationRepo;
pub use poll_repo::PollRepo;
pub use post_repo::PostRepo;
pub use profile_repo::ProfileRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use site_settings_repo::SiteSettingsRepo;
pub use song_repo::SongRepo;
pub use user_repo::UserRepo;
