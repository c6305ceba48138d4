//! Order API 模块
//!
//! 下单 / 编辑 / 作废 / 查询自己的订单由服务员操作，
//! 出品站只能读取本站订单和更新出品状态，店主读取全部订单。
//! 订单归属 (服务员只能操作自己的订单) 由订单引擎检查。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_capability(Capability::CreateOrder)));

    let own_routes = Router::new()
        .route("/my-active", get(handler::my_active))
        .layer(middleware::from_fn(require_capability(Capability::ViewOwnOrders)));

    let edit_routes = Router::new()
        .route("/{id}", put(handler::edit))
        .layer(middleware::from_fn(require_capability(Capability::EditOrder)));

    let cancel_routes = Router::new()
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_capability(Capability::CancelOrder)));

    let station_routes = Router::new()
        .route("/station", get(handler::station))
        .layer(middleware::from_fn(require_capability(
            Capability::ViewStationOrders,
        )));

    let status_routes = Router::new()
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_capability(
            Capability::UpdateOrderStatus,
        )));

    let all_routes = Router::new()
        .route("/", get(handler::list_all))
        .layer(middleware::from_fn(require_capability(Capability::ViewAllOrders)));

    let view_routes = Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/number/{order_number}", get(handler::get_by_number))
        .layer(middleware::from_fn(require_capability(Capability::ViewOrder)));

    create_routes
        .merge(own_routes)
        .merge(edit_routes)
        .merge(cancel_routes)
        .merge(station_routes)
        .merge(status_routes)
        .merge(all_routes)
        .merge(view_routes)
}
