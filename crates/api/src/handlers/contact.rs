//! Handlers for the contact form.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use schoolhub_core::contact::validate_submission;
use schoolhub_core::roles::Permission;
use schoolhub_db::models::contact::{ContactSubmission, CreateContactSubmission};
use schoolhub_db::repositories::ContactRepo;

use super::invalid;
use crate::error::AppResult;
use crate::middleware::auth::OptionalAuthUser;
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contact
///
/// Anonymous submissions are accepted; a signed-in sender is linked.
pub async fn submit(
    State(state): State<AppState>,
    sender: OptionalAuthUser,
    Json(input): Json<CreateContactSubmission>,
) -> AppResult<(StatusCode, Json<ContactSubmission>)> {
    validate_submission(&input.name, &input.email, &input.message).map_err(invalid)?;

    let input = CreateContactSubmission {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        message: input.message,
    };
    let submission = ContactRepo::create(&state.pool, sender.user_id(), &input).await?;
    tracing::info!(submission_id = submission.id, "Contact form submitted");
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/v1/admin/contact
pub async fn admin_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ContactSubmission>>>> {
    require_permission(&user, Permission::ManageSite)?;
    let (limit, offset) = page.resolve();
    let submissions = ContactRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: submissions }))
}
