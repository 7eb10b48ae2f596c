//! Handlers for editorial content: notifications, events, the changelog and
//! the legal documents.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use schoolhub_core::error::CoreError;
use schoolhub_core::markdown;
use schoolhub_core::roles::Permission;
use schoolhub_core::types::{DbId, Timestamp};
use schoolhub_db::models::content::{Changelog, LegalDocument, LegalKind};
use schoolhub_db::models::event::{CreateEvent, Event, UpdateEvent};
use schoolhub_db::models::notification::{CreateNotification, Notification, UpdateNotification};
use schoolhub_db::repositories::{ContentRepo, EventRepo, NotificationRepo};

use super::invalid;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A notification with its markdown rendered to HTML.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    #[serde(flatten)]
    pub notification: Notification,
    pub html_text: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        let html_text = markdown::render(&notification.text);
        Self {
            notification,
            html_text,
        }
    }
}

/// Body for changelog and legal document writes.
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

fn validate_text(field: &str, text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    Ok(())
}

fn validate_event_range(starts_at: Timestamp, ends_at: Option<Timestamp>) -> Result<(), String> {
    match ends_at {
        Some(end) if end < starts_at => Err("Event cannot end before it starts".to_string()),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// Enabled notifications only, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<NotificationResponse>>>> {
    let items = NotificationRepo::list_enabled(&state.pool).await?;
    let data = items.into_iter().map(NotificationResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/notifications
pub async fn admin_list_notifications(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<NotificationResponse>>>> {
    require_permission(&user, Permission::ManageSite)?;
    let items = NotificationRepo::list(&state.pool).await?;
    let data = items.into_iter().map(NotificationResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<CreateNotification>,
) -> AppResult<(StatusCode, Json<NotificationResponse>)> {
    require_permission(&user, Permission::ManageSite)?;
    validate_text("Notification text", &input.text).map_err(invalid)?;
    let item = NotificationRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /api/v1/admin/notifications/{id}
pub async fn update_notification(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNotification>,
) -> AppResult<Json<NotificationResponse>> {
    require_permission(&user, Permission::ManageSite)?;
    if let Some(text) = &input.text {
        validate_text("Notification text", text).map_err(invalid)?;
    }
    let item = NotificationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }))?;
    Ok(Json(item.into()))
}

/// DELETE /api/v1/admin/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&user, Permission::ManageSite)?;
    if NotificationRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// GET /api/v1/events
///
/// Events that have not finished yet, soonest first.
pub async fn list_events(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let events = EventRepo::list_upcoming(&state.pool, Utc::now()).await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/v1/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<Event>)> {
    require_permission(&user, Permission::ManageSite)?;
    validate_text("Event title", &input.title).map_err(invalid)?;
    validate_event_range(input.starts_at, input.ends_at).map_err(invalid)?;

    let event = EventRepo::create(&state.pool, &input).await?;
    tracing::info!(event_id = event.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/v1/admin/events/{id}
///
/// An explicit `null` for `location` or `ends_at` clears the field.
pub async fn update_event(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<Event>> {
    require_permission(&user, Permission::ManageSite)?;
    if let Some(title) = &input.title {
        validate_text("Event title", title).map_err(invalid)?;
    }
    let existing = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    validate_event_range(
        input.starts_at.unwrap_or(existing.starts_at),
        input.ends_at.unwrap_or(existing.ends_at),
    )
    .map_err(invalid)?;

    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    Ok(Json(event))
}

/// DELETE /api/v1/admin/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&user, Permission::ManageSite)?;
    if EventRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Event", id }))
    }
}

// ---------------------------------------------------------------------------
// Changelog and legal documents
// ---------------------------------------------------------------------------

/// GET /api/v1/changelog
///
/// `{"data": null}` until a changelog has been written.
pub async fn get_changelog(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<Changelog>>>> {
    let changelog = ContentRepo::latest_changelog(&state.pool).await?;
    Ok(Json(DataResponse { data: changelog }))
}

/// PUT /api/v1/admin/changelog
pub async fn save_changelog(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<ContentRequest>,
) -> AppResult<Json<Changelog>> {
    require_permission(&user, Permission::ManageSite)?;
    validate_text("Changelog", &input.content).map_err(invalid)?;
    let changelog = ContentRepo::save_changelog(&state.pool, &input.content).await?;
    Ok(Json(changelog))
}

/// GET /api/v1/legal/terms
pub async fn get_terms(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<LegalDocument>>>> {
    latest_legal(&state, LegalKind::TermsOfService).await
}

/// GET /api/v1/legal/privacy
pub async fn get_privacy(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<LegalDocument>>>> {
    latest_legal(&state, LegalKind::PrivacyPolicy).await
}

/// POST /api/v1/admin/legal/terms
pub async fn publish_terms(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<ContentRequest>,
) -> AppResult<(StatusCode, Json<LegalDocument>)> {
    publish_legal(&state, &user, LegalKind::TermsOfService, input).await
}

/// POST /api/v1/admin/legal/privacy
pub async fn publish_privacy(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<ContentRequest>,
) -> AppResult<(StatusCode, Json<LegalDocument>)> {
    publish_legal(&state, &user, LegalKind::PrivacyPolicy, input).await
}

async fn latest_legal(
    state: &AppState,
    kind: LegalKind,
) -> AppResult<Json<DataResponse<Option<LegalDocument>>>> {
    let document = ContentRepo::latest_legal(&state.pool, kind).await?;
    Ok(Json(DataResponse { data: document }))
}

/// Each publish adds a new version; readers always get the newest.
async fn publish_legal(
    state: &AppState,
    user: &AuthUser,
    kind: LegalKind,
    input: ContentRequest,
) -> AppResult<(StatusCode, Json<LegalDocument>)> {
    require_permission(user, Permission::ManageSite)?;
    validate_text(kind.label(), &input.content).map_err(invalid)?;
    let document = ContentRepo::publish_legal(&state.pool, kind, user.user_id, &input.content).await?;
    tracing::info!(document = kind.label(), author_id = user.user_id, "Legal document published");
    Ok((StatusCode::CREATED, Json(document)))
}
