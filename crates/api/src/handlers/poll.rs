//! Handlers for the weekly poll and its admin management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use schoolhub_core::error::CoreError;
use schoolhub_core::polls::{
    is_open, unlocks_at, validate_date_range, validate_options, validate_question, week_window,
    LastResult, OptionDraft, STATISTICS_SIZE,
};
use schoolhub_core::roles::Permission;
use schoolhub_core::settings::Feature;
use schoolhub_core::types::{DbId, Timestamp};
use schoolhub_db::models::poll::{
    CreatePollOption, CreatePollQuestion, LeaderboardEntry, PollOption, PollQuestionWithOptions,
    PublicPollOption, RecentParticipant, UpdatePollQuestion,
};
use schoolhub_db::repositories::PollRepo;

use super::invalid;
use super::settings::require_feature;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::{BulkDeleteRequest, PaginationParams};
use crate::response::{DataResponse, DeletedCount};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response for `GET /poll/status`.
///
/// When `locked`, `unlocks_at` and `last_result` describe the answer that
/// used up this week; otherwise `question` is the next one to answer, if any.
#[derive(Debug, Serialize)]
pub struct PollStatusResponse {
    pub locked: bool,
    pub unlocks_at: Option<Timestamp>,
    pub last_result: Option<LastResult>,
    pub question: Option<PollQuestionWithOptions<PublicPollOption>>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: DbId,
    pub option_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub question_id: DbId,
    pub selected_key: String,
    pub correct_key: Option<String>,
    pub is_correct: bool,
    pub unlocks_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct PollStatistics {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub recent_participants: Vec<RecentParticipant>,
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/poll/status
pub async fn status(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<PollStatusResponse>> {
    require_feature(&state, Feature::WeeklyPoll).await?;
    let now = Utc::now();

    let latest = PollRepo::latest_answer_outcome(&state.pool, auth.user_id).await?;
    if let Some(outcome) = latest {
        if let Some(unlocks) = unlocks_at(Some(outcome.created_at), now) {
            return Ok(Json(PollStatusResponse {
                locked: true,
                unlocks_at: Some(unlocks),
                last_result: Some(LastResult {
                    question_id: outcome.question_id,
                    selected_key: outcome.selected_key,
                    correct_key: outcome.correct_key,
                    is_correct: outcome.selected_is_correct,
                }),
                question: None,
            }));
        }
    }

    let question = match PollRepo::next_open_unanswered(&state.pool, auth.user_id, now).await? {
        Some(question) => {
            let options = PollRepo::options_for(&state.pool, &[question.id]).await?;
            Some(PollQuestionWithOptions {
                question,
                options: options.iter().map(PublicPollOption::from).collect(),
            })
        }
        None => None,
    };

    Ok(Json(PollStatusResponse {
        locked: false,
        unlocks_at: None,
        last_result: None,
        question,
    }))
}

/// POST /api/v1/poll/answer
///
/// One answer per user per week. Returns the outcome including the correct
/// key so the client can reveal it immediately.
pub async fn answer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<AnswerRequest>,
) -> AppResult<(StatusCode, Json<AnswerResponse>)> {
    require_feature(&state, Feature::WeeklyPoll).await?;
    let now = Utc::now();

    let poll = PollRepo::find_with_options(&state.pool, input.question_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PollQuestion",
            id: input.question_id,
        }))?;
    let q = &poll.question;
    if !is_open(q.is_active, q.start_date, q.end_date, now) {
        return Err(invalid("This poll is not open for answers".to_string()));
    }

    let selected = poll
        .options
        .iter()
        .find(|o| o.id == input.option_id)
        .ok_or_else(|| {
            invalid(format!(
                "Option {} does not belong to question {}",
                input.option_id, input.question_id
            ))
        })?;

    let (window_start, window_end) = week_window(now);
    PollRepo::create_answer(
        &state.pool,
        auth.user_id,
        input.question_id,
        selected.id,
        window_start,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "You have already answered a poll this week".into(),
        ))
    })?;

    let correct_key = poll
        .options
        .iter()
        .find(|o| o.is_correct)
        .map(|o| o.key.clone());

    tracing::info!(
        user_id = auth.user_id,
        question_id = input.question_id,
        is_correct = selected.is_correct,
        "Poll answered",
    );
    Ok((
        StatusCode::CREATED,
        Json(AnswerResponse {
            question_id: input.question_id,
            selected_key: selected.key.clone(),
            correct_key,
            is_correct: selected.is_correct,
            unlocks_at: window_end,
        }),
    ))
}

/// GET /api/v1/poll/statistics
pub async fn statistics(State(state): State<AppState>) -> AppResult<Json<PollStatistics>> {
    require_feature(&state, Feature::WeeklyPoll).await?;
    let leaderboard = PollRepo::leaderboard(&state.pool, STATISTICS_SIZE).await?;
    let recent_participants = PollRepo::recent_participants(&state.pool, STATISTICS_SIZE).await?;
    Ok(Json(PollStatistics {
        leaderboard,
        recent_participants,
    }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/polls
pub async fn admin_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PollQuestionWithOptions<PollOption>>>>> {
    require_permission(&user, Permission::ManagePolls)?;
    let (limit, offset) = page.resolve();
    let polls = PollRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: polls }))
}

/// GET /api/v1/admin/polls/{id}
pub async fn admin_get(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<PollQuestionWithOptions<PollOption>>> {
    require_permission(&user, Permission::ManagePolls)?;
    let poll = PollRepo::find_with_options(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PollQuestion",
            id,
        }))?;
    Ok(Json(poll))
}

/// POST /api/v1/admin/polls
pub async fn admin_create(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<CreatePollQuestion>,
) -> AppResult<(StatusCode, Json<PollQuestionWithOptions<PollOption>>)> {
    require_permission(&user, Permission::ManagePolls)?;
    validate_question(&input.title, input.subtitle.as_deref()).map_err(invalid)?;
    validate_date_range(input.start_date, input.end_date).map_err(invalid)?;
    validate_option_set(&input.options)?;

    let poll = PollRepo::create(&state.pool, &input).await?;
    tracing::info!(question_id = poll.question.id, user_id = user.user_id, "Poll created");
    Ok((StatusCode::CREATED, Json(poll)))
}

/// PUT /api/v1/admin/polls/{id}
///
/// Sending `options` replaces the whole option set; answers pointing at
/// removed keys are deleted with them. An explicit `null` for `subtitle`,
/// `start_date` or `end_date` clears the field.
pub async fn admin_update(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePollQuestion>,
) -> AppResult<Json<PollQuestionWithOptions<PollOption>>> {
    require_permission(&user, Permission::ManagePolls)?;
    let existing = PollRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PollQuestion",
            id,
        }))?;

    let subtitle = match &input.subtitle {
        Some(subtitle) => subtitle.as_deref(),
        None => existing.subtitle.as_deref(),
    };
    validate_question(input.title.as_deref().unwrap_or(&existing.title), subtitle)
        .map_err(invalid)?;
    validate_date_range(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.unwrap_or(existing.end_date),
    )
    .map_err(invalid)?;
    if let Some(options) = &input.options {
        validate_option_set(options)?;
    }

    let poll = PollRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PollQuestion",
            id,
        }))?;
    Ok(Json(poll))
}

/// DELETE /api/v1/admin/polls/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&user, Permission::ManagePolls)?;
    if PollRepo::delete(&state.pool, id).await? {
        tracing::info!(question_id = id, user_id = user.user_id, "Poll deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PollQuestion",
            id,
        }))
    }
}

/// POST /api/v1/admin/polls/bulk-delete
///
/// Unknown ids are skipped.
pub async fn admin_bulk_delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<DataResponse<DeletedCount>>> {
    require_permission(&user, Permission::ManagePolls)?;
    let deleted = PollRepo::bulk_delete(&state.pool, &input.ids).await?;
    tracing::info!(deleted, user_id = user.user_id, "Polls bulk deleted");
    Ok(Json(DataResponse {
        data: DeletedCount { deleted },
    }))
}

fn validate_option_set(options: &[CreatePollOption]) -> AppResult<()> {
    let drafts: Vec<OptionDraft<'_>> = options
        .iter()
        .map(|o| OptionDraft {
            key: o.key.as_str(),
            text: o.text.as_str(),
            is_correct: o.is_correct,
        })
        .collect();
    validate_options(&drafts).map_err(invalid)
}
