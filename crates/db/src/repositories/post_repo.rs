//! Repository for the `posts` table and its image/document attachments.

use std::collections::HashMap;

use sqlx::PgPool;
use schoolhub_core::roles::PostScope;
use schoolhub_core::types::DbId;

use crate::models::post::{
    CreatePost, CreatePostDocument, CreatePostImage, Post, PostDocument, PostFilter, PostImage,
    PostResponse, UpdatePost,
};

/// Joined select shared across queries. Callers append `WHERE`/`ORDER BY`.
const SELECT_POST: &str = "SELECT p.id, p.title, p.category_id, c.full_name AS category_name, \
                           p.banner, p.hook, p.content, p.author_id, u.username AS author_username, \
                           p.published, p.allowed, p.created_at, p.updated_at \
                           FROM posts p \
                           JOIN categories c ON c.id = p.category_id \
                           JOIN users u ON u.id = p.author_id";

const IMAGE_COLUMNS: &str = "id, post_id, image_url, created_at";

const DOCUMENT_COLUMNS: &str = "id, post_id, file_name, file_url, uploaded_at";

/// Provides CRUD operations for posts and their attachments.
pub struct PostRepo;

impl PostRepo {
    // ── Public reads ─────────────────────────────────────────────────

    /// List published and allowed posts, newest first, optionally restricted
    /// to a category slug.
    pub async fn list_public(
        pool: &PgPool,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "{SELECT_POST}
             WHERE p.published AND p.allowed
               AND ($1::TEXT IS NULL OR c.short_name = $1)
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    // ── Admin reads ──────────────────────────────────────────────────

    /// List posts visible under `scope`, with optional filters, newest first.
    pub async fn list_scoped(
        pool: &PgPool,
        scope: PostScope,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let (author, published_only) = match scope {
            PostScope::All => (None, false),
            PostScope::PublishedOnly => (None, true),
            PostScope::Own(user_id) => (Some(user_id), false),
            PostScope::OwnPublished(user_id) => (Some(user_id), true),
        };
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let query = format!(
            "{SELECT_POST}
             WHERE ($1::BIGINT IS NULL OR p.author_id = $1)
               AND (NOT $2 OR p.published)
               AND ($3::BOOLEAN IS NULL OR p.published = $3)
               AND ($4::BIGINT IS NULL OR p.category_id = $4)
               AND ($5::TEXT IS NULL OR p.title ILIKE $5 OR p.content ILIKE $5)
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(author)
            .bind(published_only)
            .bind(filter.published)
            .bind(filter.category_id)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Find a post by ID regardless of its moderation state.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("{SELECT_POST} WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert a new post and return it joined with category and author.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO posts (title, category_id, banner, hook, content, author_id, published, allowed)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(&input.title)
        .bind(input.category_id)
        .bind(&input.banner)
        .bind(&input.hook)
        .bind(&input.content)
        .bind(input.author_id)
        .bind(input.published)
        .bind(input.allowed)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply a partial update. Returns `None` if the post does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
    ) -> Result<Option<Post>, sqlx::Error> {
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE posts SET
                title = COALESCE($2, title),
                category_id = COALESCE($3, category_id),
                banner = COALESCE($4, banner),
                hook = COALESCE($5, hook),
                content = COALESCE($6, content),
                published = COALESCE($7, published),
                allowed = COALESCE($8, allowed)
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&input.title)
        .bind(input.category_id)
        .bind(&input.banner)
        .bind(&input.hook)
        .bind(&input.content)
        .bind(input.published)
        .bind(input.allowed)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    /// Set the moderation flag. Returns `None` if the post does not exist.
    pub async fn set_allowed(
        pool: &PgPool,
        id: DbId,
        allowed: bool,
    ) -> Result<Option<Post>, sqlx::Error> {
        let updated: Option<DbId> =
            sqlx::query_scalar("UPDATE posts SET allowed = $2 WHERE id = $1 RETURNING id")
                .bind(id)
                .bind(allowed)
                .fetch_optional(pool)
                .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    /// Delete a post with its comments and attachments.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Attachments ──────────────────────────────────────────────────

    /// Load images and documents for a batch of posts and assemble responses,
    /// preserving the order of `posts`.
    pub async fn with_attachments(
        pool: &PgPool,
        posts: Vec<Post>,
    ) -> Result<Vec<PostResponse>, sqlx::Error> {
        let ids: Vec<DbId> = posts.iter().map(|p| p.id).collect();
        let images = Self::images_for(pool, &ids).await?;
        let documents = Self::documents_for(pool, &ids).await?;

        let mut images_by_post: HashMap<DbId, Vec<String>> = HashMap::new();
        for image in images {
            images_by_post
                .entry(image.post_id)
                .or_default()
                .push(image.image_url);
        }
        let mut documents_by_post: HashMap<DbId, Vec<PostDocument>> = HashMap::new();
        for document in documents {
            documents_by_post
                .entry(document.post_id)
                .or_default()
                .push(document);
        }

        Ok(posts
            .into_iter()
            .map(|post| PostResponse {
                images: images_by_post.remove(&post.id).unwrap_or_default(),
                documents: documents_by_post.remove(&post.id).unwrap_or_default(),
                post,
            })
            .collect())
    }

    /// Single-post variant of [`Self::with_attachments`].
    pub async fn with_attachments_one(
        pool: &PgPool,
        post: Post,
    ) -> Result<PostResponse, sqlx::Error> {
        let mut responses = Self::with_attachments(pool, vec![post]).await?;
        responses.pop().ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn images_for(pool: &PgPool, post_ids: &[DbId]) -> Result<Vec<PostImage>, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM post_images
             WHERE post_id = ANY($1)
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, PostImage>(&query)
            .bind(post_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn documents_for(
        pool: &PgPool,
        post_ids: &[DbId],
    ) -> Result<Vec<PostDocument>, sqlx::Error> {
        let query = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM post_documents
             WHERE post_id = ANY($1)
             ORDER BY uploaded_at ASC, id ASC"
        );
        sqlx::query_as::<_, PostDocument>(&query)
            .bind(post_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn add_image(
        pool: &PgPool,
        post_id: DbId,
        input: &CreatePostImage,
    ) -> Result<PostImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO post_images (post_id, image_url) VALUES ($1, $2) RETURNING {IMAGE_COLUMNS}"
        );
        sqlx::query_as::<_, PostImage>(&query)
            .bind(post_id)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    /// Remove an image, scoped to its post.
    pub async fn remove_image(
        pool: &PgPool,
        post_id: DbId,
        image_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM post_images WHERE id = $1 AND post_id = $2")
            .bind(image_id)
            .bind(post_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn add_document(
        pool: &PgPool,
        post_id: DbId,
        input: &CreatePostDocument,
    ) -> Result<PostDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO post_documents (post_id, file_name, file_url)
             VALUES ($1, $2, $3)
             RETURNING {DOCUMENT_COLUMNS}"
        );
        sqlx::query_as::<_, PostDocument>(&query)
            .bind(post_id)
            .bind(&input.file_name)
            .bind(&input.file_url)
            .fetch_one(pool)
            .await
    }

    /// Remove a document, scoped to its post.
    pub async fn remove_document(
        pool: &PgPool,
        post_id: DbId,
        document_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM post_documents WHERE id = $1 AND post_id = $2")
            .bind(document_id)
            .bind(post_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
