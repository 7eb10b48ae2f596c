//! Handlers for meme-of-the-week uploads and votes.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use schoolhub_core::error::CoreError;
use schoolhub_core::media::{image_extension, validate_meme};
use schoolhub_core::roles::Permission;
use schoolhub_core::settings::Feature;
use schoolhub_core::types::DbId;
use schoolhub_db::models::meme::{CreateMeme, Meme};
use schoolhub_db::models::vote::VoteChange;
use schoolhub_db::repositories::MemeRepo;

use super::invalid;
use super::settings::require_feature;
use super::songs::VoteResponse;
use super::uploads;
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::{BulkDeleteRequest, PaginationParams};
use crate::response::{DataResponse, DeletedCount};
use crate::state::AppState;

/// Subdirectory of the media root holding meme images.
const MEME_DIR: &str = "memes";

/// A meme with the public URL of its image.
#[derive(Debug, Serialize)]
pub struct MemeResponse {
    #[serde(flatten)]
    pub meme: Meme,
    pub image_url: String,
}

impl MemeResponse {
    fn new(meme: Meme, config: &ServerConfig) -> Self {
        let image_url = config.media_url_for(&meme.image_path);
        Self { meme, image_url }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminMemeQuery {
    pub is_approved: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetApprovalRequest {
    pub is_approved: bool,
}

/// GET /api/v1/memes
///
/// Approved memes, plus the caller's own hidden ones.
pub async fn list(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<MemeResponse>>>> {
    require_feature(&state, Feature::MemeOfTheWeek).await?;
    let (limit, offset) = page.resolve();
    let memes = MemeRepo::list_visible(&state.pool, viewer.user_id(), limit, offset).await?;
    let data = memes
        .into_iter()
        .map(|m| MemeResponse::new(m, &state.config))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/memes
///
/// Multipart form with `title` and `image` fields.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<MemeResponse>)> {
    require_feature(&state, Feature::MemeOfTheWeek).await?;

    let max_bytes = state.config.media_max_upload_bytes;
    let mut form = uploads::read_form(multipart, "image", max_bytes).await?;
    let title = form.text("title").unwrap_or_default().to_string();
    let file = form.take_file("image")?;

    let ext = image_extension(&file.filename).map_err(invalid)?;
    validate_meme(&title, file.data.len(), max_bytes).map_err(invalid)?;

    let image_path = uploads::store(&state.config, MEME_DIR, &ext, &file.data).await?;
    let created = MemeRepo::create(
        &state.pool,
        &CreateMeme {
            user_id: auth.user_id,
            title,
            image_path: image_path.clone(),
        },
    )
    .await;
    let meme = match created {
        Ok(meme) => meme,
        Err(e) => {
            uploads::remove(&state.config, &image_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(meme_id = meme.id, user_id = auth.user_id, "Meme uploaded");
    Ok((
        StatusCode::CREATED,
        Json(MemeResponse::new(meme, &state.config)),
    ))
}

/// POST /api/v1/memes/{id}/vote
pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<VoteResponse>> {
    require_feature(&state, Feature::MemeOfTheWeek).await?;
    ensure_votable(&state, id, auth.user_id).await?;

    match MemeRepo::vote(&state.pool, id, auth.user_id).await? {
        VoteChange::Applied { votes } => Ok(Json(VoteResponse {
            votes,
            has_voted: true,
        })),
        VoteChange::Unchanged => Err(AppError::Core(CoreError::Conflict(
            "You have already voted for this meme".into(),
        ))),
        VoteChange::ItemMissing => Err(not_found(id)),
    }
}

/// DELETE /api/v1/memes/{id}/vote
pub async fn unvote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<VoteResponse>> {
    require_feature(&state, Feature::MemeOfTheWeek).await?;
    ensure_votable(&state, id, auth.user_id).await?;

    match MemeRepo::unvote(&state.pool, id, auth.user_id).await? {
        VoteChange::Applied { votes } => Ok(Json(VoteResponse {
            votes,
            has_voted: false,
        })),
        VoteChange::Unchanged => Err(AppError::Core(CoreError::NotFound {
            entity: "MemeVote",
            id,
        })),
        VoteChange::ItemMissing => Err(not_found(id)),
    }
}

/// GET /api/v1/admin/memes?is_approved=
pub async fn admin_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(query): Query<AdminMemeQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<MemeResponse>>>> {
    require_permission(&user, Permission::ModerateMedia)?;
    let (limit, offset) = page.resolve();
    let memes =
        MemeRepo::list_all(&state.pool, user.user_id, query.is_approved, limit, offset).await?;
    let data = memes
        .into_iter()
        .map(|m| MemeResponse::new(m, &state.config))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/admin/memes/{id}/approval
pub async fn admin_set_approval(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<SetApprovalRequest>,
) -> AppResult<Json<MemeResponse>> {
    require_permission(&user, Permission::ModerateMedia)?;
    let meme = MemeRepo::set_approval(&state.pool, id, input.is_approved, user.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(meme_id = id, is_approved = input.is_approved, "Meme moderated");
    Ok(Json(MemeResponse::new(meme, &state.config)))
}

/// POST /api/v1/admin/memes/bulk-delete
///
/// Deletes the rows, then their image files.
pub async fn admin_bulk_delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<DataResponse<DeletedCount>>> {
    require_permission(&user, Permission::ModerateMedia)?;
    let paths = MemeRepo::bulk_delete(&state.pool, &input.ids).await?;
    for path in &paths {
        uploads::remove(&state.config, path).await;
    }

    let deleted = paths.len() as u64;
    tracing::info!(deleted, user_id = user.user_id, "Memes bulk deleted");
    Ok(Json(DataResponse {
        data: DeletedCount { deleted },
    }))
}

/// Only approved memes take votes; anything else looks missing.
async fn ensure_votable(state: &AppState, id: DbId, user_id: DbId) -> AppResult<()> {
    let meme = MemeRepo::find_by_id(&state.pool, id, Some(user_id))
        .await?
        .ok_or_else(|| not_found(id))?;
    if !meme.is_approved {
        return Err(not_found(id));
    }
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Meme", id })
}
