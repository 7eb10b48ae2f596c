//! Handlers for comments on public posts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use schoolhub_core::comments::{resolve_parent, validate_content};
use schoolhub_core::error::CoreError;
use schoolhub_core::posts::is_publicly_visible;
use schoolhub_core::roles::{has_permission, Permission};
use schoolhub_core::types::DbId;
use schoolhub_db::models::comment::{Comment, CommentInsert, CreateComment};
use schoolhub_db::repositories::{CommentRepo, PostRepo};

use super::invalid;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    /// Comment being replied to. Replies to replies attach to the top-level comment.
    pub parent_id: Option<DbId>,
}

/// Query parameters for `GET /admin/comments`.
#[derive(Debug, Deserialize)]
pub struct AdminCommentQuery {
    pub post_id: Option<DbId>,
}

/// GET /api/v1/posts/{post_id}/comments
///
/// Newest first. Only available for publicly visible posts.
pub async fn list_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Comment>>>> {
    ensure_public_post(&state, post_id).await?;
    let comments = CommentRepo::list_for_post(&state.pool, post_id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/posts/{post_id}/comments
///
/// Rate-limited per user; exceeding the limit returns 429 with a
/// `retry_after_secs` hint.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    ensure_public_post(&state, post_id).await?;
    validate_content(&input.content).map_err(invalid)?;

    let parent = match input.parent_id {
        Some(parent_id) => Some(
            CommentRepo::find_parent_ref(&state.pool, parent_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Comment",
                    id: parent_id,
                }))?,
        ),
        None => None,
    };
    let parent_id = resolve_parent(post_id, parent).map_err(invalid)?;

    let outcome = CommentRepo::create_rate_limited(
        &state.pool,
        &CreateComment {
            post_id,
            user_id: auth.user_id,
            parent_id,
            content: input.content.trim().to_string(),
        },
        &state.config.comment_rate_limit,
        Utc::now(),
    )
    .await?;

    match outcome {
        CommentInsert::Created(comment) => {
            tracing::info!(comment_id = comment.id, post_id, user_id = auth.user_id, "Comment created");
            Ok((StatusCode::CREATED, Json(comment)))
        }
        CommentInsert::RateLimited { retry_after_secs } => {
            tracing::debug!(user_id = auth.user_id, retry_after_secs, "Comment rate limit hit");
            Err(AppError::Core(CoreError::RateLimited { retry_after_secs }))
        }
    }
}

/// DELETE /api/v1/comments/{id}
///
/// The author may delete their own comment; anyone else needs
/// `moderate_comments`. Replies are deleted with their parent.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;

    if comment.user_id != auth.user_id
        && !has_permission(&auth.role, Permission::ModerateComments)
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only delete your own comments".into(),
        )));
    }

    CommentRepo::delete(&state.pool, id).await?;
    tracing::info!(comment_id = id, user_id = auth.user_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/comments?post_id=&limit=&offset=
pub async fn admin_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(query): Query<AdminCommentQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Comment>>>> {
    require_permission(&user, Permission::ModerateComments)?;
    let (limit, offset) = page.resolve();
    let comments = CommentRepo::list_recent(&state.pool, query.post_id, limit, offset).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// DELETE /api/v1/admin/comments/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&user, Permission::ModerateComments)?;
    if CommentRepo::delete(&state.pool, id).await? {
        tracing::info!(comment_id = id, user_id = user.user_id, "Comment removed by moderator");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))
    }
}

async fn ensure_public_post(state: &AppState, post_id: DbId) -> AppResult<()> {
    PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .filter(|p| is_publicly_visible(p.published, p.allowed))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;
    Ok(())
}
