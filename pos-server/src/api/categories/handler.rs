//! Category API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::message::emit;
use crate::utils::validation::validate;
use crate::utils::{AppError, ErrorCode, ok, ok_with_message};

/// GET /api/categories - 店主看到全部，其他角色只看启用的
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Vec<Category>> {
    let categories = state.categories.find_all(!current_user.is_owner())?;
    Ok(ok(categories))
}

/// GET /api/categories/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<Category> {
    let category = state.categories.find_by_id(&id)?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CategoryNotFound,
            format!("Category {} not found", id),
        )
    })?;
    Ok(ok(category))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CategoryCreate>,
) -> ApiResult<Category> {
    validate(&payload)?;
    let category = state
        .categories
        .create(payload, Some(current_user.id.clone()))?;

    tracing::info!(category_id = %category.id, name = %category.name.en, "Category created");
    emit::menu_updated(&state.bus, "category-created", Some(&category.id), Some(&category));

    Ok(ok_with_message(category, "Category created successfully"))
}

/// PUT /api/categories/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    validate(&payload)?;
    let category = state.categories.update(&id, payload)?;

    tracing::info!(category_id = %category.id, "Category updated");
    emit::menu_updated(&state.bus, "category-updated", Some(&category.id), Some(&category));

    Ok(ok_with_message(category, "Category updated successfully"))
}

/// DELETE /api/categories/:id - 仍有菜品引用时拒绝
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<Category> {
    let category = state.categories.delete(&id)?;

    tracing::info!(category_id = %category.id, name = %category.name.en, "Category deleted");
    emit::menu_updated::<Category>(&state.bus, "category-deleted", Some(&category.id), None);

    Ok(ok_with_message(category, "Category deleted successfully"))
}
