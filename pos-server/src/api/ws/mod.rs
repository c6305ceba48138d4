//! Realtime WebSocket 模块
//!
//! GET /api/ws?token=<JWT>
//! 浏览器 WebSocket 不支持自定义 header，令牌通过 query 传递，
//! 由 handler 自行认证 (不经过 require_auth)。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/ws", get(handler::handle_ws))
}
