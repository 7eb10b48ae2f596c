//! Handlers for posts: the public feed and the scoped admin surface.
//!
//! Public endpoints only ever expose posts that are both published and
//! allowed. Admin endpoints resolve a [`PostScope`] from the caller's role
//! and treat posts outside it as missing.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use schoolhub_core::error::CoreError;
use schoolhub_core::posts::{is_publicly_visible, validate_content, validate_teaser, validate_title};
use schoolhub_core::roles::{can_edit_post, can_set_allowed, post_scope, Permission};
use schoolhub_core::types::DbId;
use schoolhub_db::models::post::{
    CreatePost, CreatePostDocument, CreatePostImage, Post, PostDocument, PostFilter, PostImage,
    PostResponse, UpdatePost,
};
use schoolhub_db::repositories::{CategoryRepo, PostRepo};

use super::invalid;
use super::uploads::{self, extension_or_default};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /posts`.
#[derive(Debug, Deserialize)]
pub struct PublicPostQuery {
    /// Category slug (`short_name`).
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub category_id: DbId,
    #[serde(default)]
    pub banner: String,
    #[serde(default)]
    pub hook: String,
    pub content: String,
    #[serde(default)]
    pub published: bool,
    /// Ignored unless the caller may allow posts.
    #[serde(default)]
    pub allowed: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub category_id: Option<DbId>,
    pub banner: Option<String>,
    pub hook: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    /// Ignored unless the caller may allow posts.
    pub allowed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AllowRequest {
    pub allowed: bool,
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/posts?category=&limit=&offset=
pub async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<PublicPostQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PostResponse>>>> {
    let (limit, offset) = page.resolve();
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let posts = PostRepo::list_public(&state.pool, category, limit, offset).await?;
    let data = PostRepo::with_attachments(&state.pool, posts).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/posts/{id}
pub async fn get_public(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PostResponse>> {
    let post = PostRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| is_publicly_visible(p.published, p.allowed))
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))?;
    let response = PostRepo::with_attachments_one(&state.pool, post).await?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/posts?published=&category_id=&search=&limit=&offset=
///
/// Lists the posts inside the caller's scope.
pub async fn admin_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(filter): Query<PostFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PostResponse>>>> {
    let scope = post_scope(&user.role, user.user_id);
    let (limit, offset) = page.resolve();
    let posts = PostRepo::list_scoped(&state.pool, scope, &filter, limit, offset).await?;
    let data = PostRepo::with_attachments(&state.pool, posts).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/posts/{id}
pub async fn admin_get(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<PostResponse>> {
    let post = find_in_scope(&state, &user, id).await?;
    let response = PostRepo::with_attachments_one(&state.pool, post).await?;
    Ok(Json(response))
}

/// POST /api/v1/admin/posts
///
/// The caller becomes the author. `allowed` is only honoured for callers
/// holding `can_allow_posts`.
pub async fn admin_create(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    validate_title(&input.title).map_err(invalid)?;
    validate_content(&input.content).map_err(invalid)?;
    validate_teaser(&input.banner, &input.hook).map_err(invalid)?;
    ensure_category_exists(&state, input.category_id).await?;

    let allowed = can_set_allowed(&user.role) && input.allowed;
    let post = PostRepo::create(
        &state.pool,
        &CreatePost {
            title: input.title.trim().to_string(),
            category_id: input.category_id,
            banner: input.banner,
            hook: input.hook,
            content: input.content,
            author_id: user.user_id,
            published: input.published,
            allowed,
        },
    )
    .await?;

    tracing::info!(post_id = post.id, user_id = user.user_id, "Post created");
    let response = PostRepo::with_attachments_one(&state.pool, post).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/v1/admin/posts/{id}
pub async fn admin_update(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePostRequest>,
) -> AppResult<Json<PostResponse>> {
    let existing = find_editable(&state, &user, id).await?;

    if let Some(title) = &input.title {
        validate_title(title).map_err(invalid)?;
    }
    if let Some(content) = &input.content {
        validate_content(content).map_err(invalid)?;
    }
    validate_teaser(
        input.banner.as_deref().unwrap_or(&existing.banner),
        input.hook.as_deref().unwrap_or(&existing.hook),
    )
    .map_err(invalid)?;
    if let Some(category_id) = input.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let update = UpdatePost {
        title: input.title.map(|t| t.trim().to_string()),
        category_id: input.category_id,
        banner: input.banner,
        hook: input.hook,
        content: input.content,
        published: input.published,
        allowed: input.allowed.filter(|_| can_set_allowed(&user.role)),
    };
    let post = PostRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))?;

    let response = PostRepo::with_attachments_one(&state.pool, post).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/admin/posts/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_editable(&state, &user, id).await?;
    PostRepo::delete(&state.pool, id).await?;
    tracing::info!(post_id = id, user_id = user.user_id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/posts/{id}/allow
///
/// Set or clear the moderation flag. Requires `can_allow_posts`.
pub async fn admin_allow(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<AllowRequest>,
) -> AppResult<Json<PostResponse>> {
    require_permission(&user, Permission::AllowPosts)?;
    find_in_scope(&state, &user, id).await?;

    let post = PostRepo::set_allowed(&state.pool, id, input.allowed)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))?;
    tracing::info!(post_id = id, allowed = input.allowed, "Post moderation flag changed");

    let response = PostRepo::with_attachments_one(&state.pool, post).await?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/posts/{id}/images
///
/// Multipart form with an `image` field.
pub async fn add_image(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostImage>)> {
    find_editable(&state, &user, id).await?;

    let mut form =
        uploads::read_form(multipart, "image", state.config.media_max_upload_bytes).await?;
    let file = form.take_file("image")?;
    let ext = schoolhub_core::media::image_extension(&file.filename).map_err(invalid)?;
    let relative = uploads::store(&state.config, "posts/images", &ext, &file.data).await?;

    let image = PostRepo::add_image(
        &state.pool,
        id,
        &CreatePostImage {
            image_url: state.config.media_url_for(&relative),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// DELETE /api/v1/admin/posts/{id}/images/{image_id}
pub async fn remove_image(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path((id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_editable(&state, &user, id).await?;
    if PostRepo::remove_image(&state.pool, id, image_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PostImage",
            id: image_id,
        }))
    }
}

/// POST /api/v1/admin/posts/{id}/documents
///
/// Multipart form with a `file` field and an optional `file_name` display
/// name (defaults to the uploaded filename).
pub async fn add_document(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostDocument>)> {
    find_editable(&state, &user, id).await?;

    let mut form =
        uploads::read_form(multipart, "file", state.config.media_max_upload_bytes).await?;
    let file_name = form.text("file_name").map(str::to_string);
    let file = form.take_file("file")?;
    if file.data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let ext = extension_or_default(&file.filename);
    let relative = uploads::store(&state.config, "posts/documents", &ext, &file.data).await?;

    let document = PostRepo::add_document(
        &state.pool,
        id,
        &CreatePostDocument {
            file_name: file_name.unwrap_or(file.filename),
            file_url: state.config.media_url_for(&relative),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// DELETE /api/v1/admin/posts/{id}/documents/{document_id}
pub async fn remove_document(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path((id, document_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_editable(&state, &user, id).await?;
    if PostRepo::remove_document(&state.pool, id, document_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PostDocument",
            id: document_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a post the caller can see in the admin surface; 404 otherwise.
async fn find_in_scope(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Post> {
    let scope = post_scope(&user.role, user.user_id);
    PostRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| scope.includes(p.author_id, p.published))
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))
}

/// Load a post the caller can see and edit; 403 when visible but not theirs.
async fn find_editable(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Post> {
    let post = find_in_scope(state, user, id).await?;
    if !can_edit_post(&user.role, user.user_id, post.author_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only edit your own posts".into(),
        )));
    }
    Ok(post)
}

async fn ensure_category_exists(state: &AppState, id: DbId) -> AppResult<()> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(())
}
