//! Handlers for bell song suggestions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use schoolhub_core::error::CoreError;
use schoolhub_core::media::{
    classify_link, validate_slot, validate_status, validate_suggestion_text, STATUS_APPROVED,
};
use schoolhub_core::roles::Permission;
use schoolhub_core::settings::Feature;
use schoolhub_core::types::DbId;
use schoolhub_db::models::song::{CreateSongSuggestion, SongSuggestion};
use schoolhub_db::models::vote::VoteChange;
use schoolhub_db::repositories::SongRepo;

use super::invalid;
use super::settings::require_feature;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::{BulkDeleteRequest, PaginationParams};
use crate::response::{DataResponse, DeletedCount};
use crate::state::AppState;

/// Counter state after a vote or unvote.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub votes: i32,
    pub has_voted: bool,
}

#[derive(Debug, Deserialize)]
pub struct AdminSongQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// GET /api/v1/songs
///
/// Approved suggestions, plus the caller's own pending or rejected ones.
pub async fn list(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<SongSuggestion>>>> {
    require_feature(&state, Feature::BellSuggestions).await?;
    let (limit, offset) = page.resolve();
    let songs = SongRepo::list_visible(&state.pool, viewer.user_id(), limit, offset).await?;
    Ok(Json(DataResponse { data: songs }))
}

/// POST /api/v1/songs
///
/// New suggestions start as `pending`.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateSongSuggestion>,
) -> AppResult<(StatusCode, Json<SongSuggestion>)> {
    require_feature(&state, Feature::BellSuggestions).await?;
    validate_suggestion_text(&input.title, input.note.as_deref()).map_err(invalid)?;
    classify_link(&input.link).map_err(invalid)?;
    validate_slot(&input.slot).map_err(invalid)?;

    let input = CreateSongSuggestion {
        title: input.title.trim().to_string(),
        link: input.link.trim().to_string(),
        slot: input.slot,
        note: input.note.filter(|n| !n.trim().is_empty()),
    };
    let song = SongRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(suggestion_id = song.id, user_id = auth.user_id, "Song suggested");
    Ok((StatusCode::CREATED, Json(song)))
}

/// POST /api/v1/songs/{id}/vote
pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<VoteResponse>> {
    require_feature(&state, Feature::BellSuggestions).await?;
    ensure_votable(&state, id, auth.user_id).await?;

    match SongRepo::vote(&state.pool, id, auth.user_id).await? {
        VoteChange::Applied { votes } => Ok(Json(VoteResponse {
            votes,
            has_voted: true,
        })),
        VoteChange::Unchanged => Err(AppError::Core(CoreError::Conflict(
            "You have already voted for this song".into(),
        ))),
        VoteChange::ItemMissing => Err(not_found(id)),
    }
}

/// DELETE /api/v1/songs/{id}/vote
pub async fn unvote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<VoteResponse>> {
    require_feature(&state, Feature::BellSuggestions).await?;
    ensure_votable(&state, id, auth.user_id).await?;

    match SongRepo::unvote(&state.pool, id, auth.user_id).await? {
        VoteChange::Applied { votes } => Ok(Json(VoteResponse {
            votes,
            has_voted: false,
        })),
        VoteChange::Unchanged => Err(AppError::Core(CoreError::NotFound {
            entity: "SongVote",
            id,
        })),
        VoteChange::ItemMissing => Err(not_found(id)),
    }
}

/// GET /api/v1/admin/songs?status=
pub async fn admin_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(query): Query<AdminSongQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<SongSuggestion>>>> {
    require_permission(&user, Permission::ModerateMedia)?;
    if let Some(status) = &query.status {
        validate_status(status).map_err(invalid)?;
    }
    let (limit, offset) = page.resolve();
    let songs =
        SongRepo::list_all(&state.pool, user.user_id, query.status.as_deref(), limit, offset)
            .await?;
    Ok(Json(DataResponse { data: songs }))
}

/// PUT /api/v1/admin/songs/{id}/status
pub async fn admin_set_status(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<Json<SongSuggestion>> {
    require_permission(&user, Permission::ModerateMedia)?;
    validate_status(&input.status).map_err(invalid)?;

    let song = SongRepo::set_status(&state.pool, id, &input.status, user.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(suggestion_id = id, status = %song.status, "Song suggestion moderated");
    Ok(Json(song))
}

/// POST /api/v1/admin/songs/bulk-delete
pub async fn admin_bulk_delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<DataResponse<DeletedCount>>> {
    require_permission(&user, Permission::ModerateMedia)?;
    let deleted = SongRepo::bulk_delete(&state.pool, &input.ids).await?;
    tracing::info!(deleted, user_id = user.user_id, "Song suggestions bulk deleted");
    Ok(Json(DataResponse {
        data: DeletedCount { deleted },
    }))
}

/// Only approved suggestions take votes; anything else looks missing.
async fn ensure_votable(state: &AppState, id: DbId, user_id: DbId) -> AppResult<()> {
    let song = SongRepo::find_by_id(&state.pool, id, Some(user_id))
        .await?
        .ok_or_else(|| not_found(id))?;
    if song.status != STATUS_APPROVED {
        return Err(not_found(id));
    }
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "SongSuggestion",
        id,
    })
}
