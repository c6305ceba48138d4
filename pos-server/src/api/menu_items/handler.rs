//! Menu Item API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::message::{EventName, Room};
use shared::models::{
    AvailabilityUpdate, MenuItem, MenuItemCreate, MenuItemFilter, MenuItemUpdate, StockChange,
    StockDeductRequest, StockDeductResult, StockUpdate,
};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::message::emit;
use crate::services::ledger::low_stock_alert;
use crate::utils::validation::validate;
use crate::utils::{AppError, ErrorCode, ok, ok_with_message};

fn menu_item_not_found(id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::MenuItemNotFound,
        format!("Menu item {} not found", id),
    )
}

/// 删除不再被菜品引用的图片，失败只记日志
async fn discard_image(state: &ServerState, public_id: &str) {
    if let Err(e) = state.images.delete(public_id).await {
        tracing::warn!(public_id = %public_id, error = %e, "Failed to delete menu item image");
    }
}

// ========== Read ==========

/// GET /api/menu-items - 当前可点的菜品
pub async fn list_active(State(state): State<ServerState>) -> ApiResult<Vec<MenuItem>> {
    Ok(ok(state.menu_items.find_active()?))
}

/// GET /api/menu-items/all?category=&prep_station=&available=
pub async fn list_all(
    State(state): State<ServerState>,
    Query(filter): Query<MenuItemFilter>,
) -> ApiResult<Vec<MenuItem>> {
    Ok(ok(state.menu_items.find_all(&filter)?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<MenuItem> {
    let item = state
        .menu_items
        .find_by_id(&id)?
        .ok_or_else(|| menu_item_not_found(&id))?;
    Ok(ok(item))
}

// ========== Manage ==========

pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<MenuItemCreate>,
) -> ApiResult<MenuItem> {
    validate(&payload)?;
    let item = state
        .menu_items
        .create(payload, Some(current_user.id.clone()))?;

    tracing::info!(item_id = %item.id, name = %item.name.en, "Menu item created");
    emit::menu_updated(&state.bus, "created", Some(&item.id), Some(&item));

    Ok(ok_with_message(item, "Menu item created successfully"))
}

/// PUT /api/menu-items/:id
///
/// 换图时旧图片尽力删除。
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    validate(&payload)?;
    let previous = state
        .menu_items
        .find_by_id(&id)?
        .ok_or_else(|| menu_item_not_found(&id))?;

    let item = state.menu_items.update(&id, payload)?;

    if let Some(old) = previous.image_public_id.as_deref()
        && item.image_public_id.as_deref() != Some(old)
    {
        discard_image(&state, old).await;
    }

    tracing::info!(item_id = %item.id, "Menu item updated");
    emit::menu_updated(&state.bus, "updated", Some(&item.id), Some(&item));

    Ok(ok_with_message(item, "Menu item updated successfully"))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<MenuItem> {
    let item = state.menu_items.delete(&id)?;

    if let Some(public_id) = item.image_public_id.as_deref() {
        discard_image(&state, public_id).await;
    }

    tracing::info!(item_id = %item.id, name = %item.name.en, "Menu item deleted");
    emit::menu_updated::<MenuItem>(&state.bus, "deleted", Some(&item.id), None);

    Ok(ok_with_message(item, "Menu item deleted successfully"))
}

// ========== Stock ==========

/// PUT /api/menu-items/:id/stock - add / remove / set
pub async fn update_stock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockUpdate>,
) -> ApiResult<StockChange> {
    validate(&payload)?;
    let (item, change) = state.ledger.adjust_stock(&id, &payload)?;

    if let Some(alert) = low_stock_alert(&item) {
        emit::to_room(&state.bus, &Room::owner(), EventName::LowStockAlert, &alert);
    }
    emit::menu_updated(&state.bus, "stock-updated", Some(&item.id), Some(&item));

    Ok(ok_with_message(change, "Stock updated successfully"))
}

/// POST /api/menu-items/stock/deduct - 批量扣减，不存在的菜品跳过
pub async fn deduct_stock(
    State(state): State<ServerState>,
    Json(payload): Json<StockDeductRequest>,
) -> ApiResult<StockDeductResult> {
    validate(&payload)?;
    let result = state.ledger.deduct_batch(&payload.items)?;

    for alert in &result.low_stock_alerts {
        emit::to_room(&state.bus, &Room::owner(), EventName::LowStockAlert, alert);
    }
    if !result.updated_items.is_empty() {
        emit::menu_updated(&state.bus, "stock-updated", None, Some(&result.updated_items));
    }

    Ok(ok(result))
}

/// PATCH /api/menu-items/:id/availability
///
/// 库存为 0 时不能手动上架 (ProductOutOfStock)。
pub async fn toggle_availability(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AvailabilityUpdate>,
) -> ApiResult<MenuItem> {
    let item = state.ledger.set_availability(&id, payload.available)?;

    tracing::info!(
        item_id = %item.id,
        available = item.available,
        changed_by = %current_user.id,
        "Menu item availability changed"
    );
    emit::menu_updated(&state.bus, "availability-changed", Some(&item.id), Some(&item));

    Ok(ok_with_message(
        item,
        if payload.available {
            "Item marked as available"
        } else {
            "Item marked as unavailable"
        },
    ))
}
