//! Add-on API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{AddOn, AddOnCreate, AddOnUpdate};

use crate::api::ApiResult;
use crate::core::ServerState;
use crate::message::emit;
use crate::utils::validation::validate;
use crate::utils::{AppError, ErrorCode, ok, ok_with_message};

pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<AddOn>> {
    Ok(ok(state.add_ons.find_all()?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<AddOn> {
    let add_on = state.add_ons.find_by_id(&id)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::AddOnNotFound, format!("Add-on {} not found", id))
    })?;
    Ok(ok(add_on))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AddOnCreate>,
) -> ApiResult<AddOn> {
    validate(&payload)?;
    let add_on = state.add_ons.create(payload)?;

    tracing::info!(add_on_id = %add_on.id, name = %add_on.name.en, price = add_on.price, "Add-on created");
    emit::menu_updated(&state.bus, "addon-created", Some(&add_on.id), Some(&add_on));

    Ok(ok_with_message(add_on, "Add-on created successfully"))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AddOnUpdate>,
) -> ApiResult<AddOn> {
    validate(&payload)?;
    let add_on = state.add_ons.update(&id, payload)?;

    tracing::info!(add_on_id = %add_on.id, "Add-on updated");
    emit::menu_updated(&state.bus, "addon-updated", Some(&add_on.id), Some(&add_on));

    Ok(ok_with_message(add_on, "Add-on updated successfully"))
}

/// 仍被菜品引用时拒绝 (AddOnInUse)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<AddOn> {
    let add_on = state.add_ons.delete(&id)?;

    tracing::info!(add_on_id = %add_on.id, "Add-on deleted");
    emit::menu_updated::<AddOn>(&state.bus, "addon-deleted", Some(&add_on.id), None);

    Ok(ok_with_message(add_on, "Add-on deleted successfully"))
}
