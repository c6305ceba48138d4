//! Settings API 模块
//!
//! 读取对所有角色开放，修改和日常运营操作仅店主。
//! 清空数据、清屏、开新一天都需要重新输入 PIN。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::get))
        .layer(middleware::from_fn(require_capability(Capability::ViewSettings)));

    let manage_routes = Router::new()
        .route("/appearance", put(handler::update_appearance))
        .route("/order-management", put(handler::update_order_management))
        .route("/takeaway-pricing", put(handler::update_takeaway_pricing))
        .route("/reset-analytics", post(handler::reset_analytics))
        .route("/start-new-day", post(handler::start_new_day))
        .route("/clear-display", post(handler::clear_display))
        .layer(middleware::from_fn(require_capability(Capability::ManageSettings)));

    read_routes.merge(manage_routes)
}
