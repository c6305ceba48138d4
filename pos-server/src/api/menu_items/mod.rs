//! Menu Item API 模块
//!
//! 菜单读取对所有角色开放；维护、库存调整仅店主；
//! 可用性开关店主和出品站都可以操作。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu-items", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list_active))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_capability(Capability::ViewMenu)));

    let manage_routes = Router::new()
        .route("/all", get(handler::list_all))
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_capability(Capability::ManageMenu)));

    let stock_routes = Router::new()
        .route("/{id}/stock", put(handler::update_stock))
        .layer(middleware::from_fn(require_capability(Capability::AdjustStock)));

    let deduct_routes = Router::new()
        .route("/stock/deduct", post(handler::deduct_stock))
        .layer(middleware::from_fn(require_capability(Capability::DeductStock)));

    let availability_routes = Router::new()
        .route("/{id}/availability", patch(handler::toggle_availability))
        .layer(middleware::from_fn(require_capability(
            Capability::ToggleAvailability,
        )));

    read_routes
        .merge(manage_routes)
        .merge(stock_routes)
        .merge(deduct_routes)
        .merge(availability_routes)
}
