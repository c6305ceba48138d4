//! Order API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::models::{
    CancelOrderRequest, CreateOrderRequest, EditOrderRequest, Order, OrderCancelled,
    OrderCreated, OrderFilter, UpdateOrderStatusRequest,
};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::OrderQuery;
use crate::utils::time::{day_end_millis, day_start_millis, resolve_range};
use crate::utils::validation::validate;
use crate::utils::{AppError, ok, ok_with_message};

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<OrderCreated> {
    validate(&payload)?;
    let created = state.orders.create_order(&current_user, payload)?;
    Ok(ok_with_message(created, "Order created successfully"))
}

/// GET /api/orders/my-active
pub async fn my_active(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Vec<Order>> {
    Ok(ok(state.orders.my_active_orders(&current_user.id)?))
}

/// GET /api/orders/station - 当前出品站的订单 (只含本站菜品)
pub async fn station(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Vec<Order>> {
    let station = current_user
        .role
        .station()
        .ok_or_else(|| AppError::forbidden("Only station staff can view station orders"))?;
    Ok(ok(state.orders.station_orders(station)?))
}

/// GET /api/orders?status=&start_date=&end_date=&waitress_id=
pub async fn list_all(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Vec<Order>> {
    let tz = state.config.timezone;
    let created_between = if filter.start_date.is_some() || filter.end_date.is_some() {
        let (start, end) =
            resolve_range(filter.start_date.as_deref(), filter.end_date.as_deref(), tz)?;
        Some((day_start_millis(start, tz), day_end_millis(end, tz)))
    } else {
        None
    };

    let query = OrderQuery {
        status: filter.status,
        waitress_id: filter.waitress_id,
        created_between,
    };
    Ok(ok(state.orders.all_orders(&query)?))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    Ok(ok(state.orders.get_order(&id, &current_user)?))
}

/// GET /api/orders/number/:order_number - 按小票单号查询
pub async fn get_by_number(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(order_number): Path<String>,
) -> ApiResult<Order> {
    Ok(ok(state.orders.get_order_by_number(&order_number, &current_user)?))
}

/// PUT /api/orders/:id - 宽限期内编辑
pub async fn edit(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<EditOrderRequest>,
) -> ApiResult<Order> {
    validate(&payload)?;
    let order = state.orders.edit_order(&id, &current_user, payload)?;
    Ok(ok_with_message(order, "Order updated successfully"))
}

/// PATCH /api/orders/:id/status
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Order> {
    let order = state.orders.update_status(&id, &current_user, payload)?;
    Ok(ok_with_message(order, "Order status updated"))
}

/// POST /api/orders/:id/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<CancelOrderRequest>,
) -> ApiResult<OrderCancelled> {
    validate(&payload)?;
    let cancelled = state.orders.cancel_order(&id, &current_user, payload)?;
    let message = if cancelled.requires_review {
        "Order cancelled. Requires owner review."
    } else {
        "Order cancelled successfully"
    };
    Ok(ok_with_message(cancelled, message))
}
