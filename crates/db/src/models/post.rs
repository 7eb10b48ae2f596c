//! Post entity models and DTOs, plus attached images and documents.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A post row joined with its category name and author username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub title: String,
    pub category_id: DbId,
    pub category_name: String,
    pub banner: String,
    pub hook: String,
    pub content: String,
    pub author_id: DbId,
    pub author_username: String,
    pub published: bool,
    pub allowed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `post_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostImage {
    pub id: DbId,
    pub post_id: DbId,
    pub image_url: String,
    pub created_at: Timestamp,
}

/// A row from the `post_documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostDocument {
    pub id: DbId,
    #[serde(skip)]
    pub post_id: DbId,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_at: Timestamp,
}

/// A post together with its attachments, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: Post,
    /// Image URLs in upload order.
    pub images: Vec<String>,
    pub documents: Vec<PostDocument>,
}

/// DTO for creating a post. `author_id` comes from the authenticated user.
#[derive(Debug)]
pub struct CreatePost {
    pub title: String,
    pub category_id: DbId,
    pub banner: String,
    pub hook: String,
    pub content: String,
    pub author_id: DbId,
    pub published: bool,
    pub allowed: bool,
}

/// DTO for updating a post. All fields are optional.
#[derive(Debug, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub category_id: Option<DbId>,
    pub banner: Option<String>,
    pub hook: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub allowed: Option<bool>,
}

/// Optional filters for the admin post listing.
#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub category_id: Option<DbId>,
    /// Case-insensitive match against title and content.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostImage {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostDocument {
    pub file_name: String,
    pub file_url: String,
}
