//! Handlers for post categories.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use schoolhub_core::error::CoreError;
use schoolhub_core::posts::{validate_category_slug, MAX_CATEGORY_NAME_LENGTH};
use schoolhub_core::roles::Permission;
use schoolhub_core::types::DbId;
use schoolhub_db::models::category::{Category, CreateCategory, UpdateCategory};
use schoolhub_db::repositories::CategoryRepo;

use super::invalid;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{require_permission, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_full_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
        return Err(format!(
            "Category name exceeds maximum length of {MAX_CATEGORY_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// GET /api/v1/categories
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = CategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/admin/categories
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    require_permission(&user, Permission::ManageSite)?;
    validate_full_name(&input.full_name).map_err(invalid)?;
    validate_category_slug(&input.short_name).map_err(invalid)?;

    let category = CategoryRepo::create(&state.pool, &input).await?;
    tracing::info!(category_id = category.id, slug = %category.short_name, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/v1/admin/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    require_permission(&user, Permission::ManageSite)?;
    if let Some(name) = &input.full_name {
        validate_full_name(name).map_err(invalid)?;
    }
    if let Some(slug) = &input.short_name {
        validate_category_slug(slug).map_err(invalid)?;
    }

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(category))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Deleting a category deletes its posts.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_permission(&user, Permission::ManageSite)?;
    let deleted = CategoryRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(category_id = id, "Category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
    }
}
