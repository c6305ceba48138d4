//! HTTP 路由装配
//!
//! [`build_router`] 注册所有 API 路由，[`build_app`] 在其上叠加
//! Tower 中间件和全局认证。HTTP 服务器和 oneshot 调用 (测试) 共用 `build_app`。

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;

pub mod middleware;
pub mod router_ext;

pub use router_ext::{OneshotResult, OneshotRouter};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router(upload_max_bytes: usize) -> Router<ServerState> {
    Router::new()
        // Public
        .merge(api::health::router())
        .merge(api::ws::router())
        // Authenticated, capability-gated per route
        .merge(api::auth::router())
        .merge(api::staff::router())
        .merge(api::categories::router())
        .merge(api::add_ons::router())
        .merge(api::menu_items::router())
        .merge(api::orders::router())
        .merge(api::payments::router())
        .merge(api::settings::router())
        .merge(api::analytics::router())
        .merge(api::upload::router(upload_max_bytes))
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router(state.config.upload_max_bytes)
        // ========== Application Middleware ==========
        // JWT authentication - injects CurrentUser before capability checks
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        // Request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        // ========== Tower HTTP Middleware ==========
        // Trace - Request tracing spans
        .layer(TraceLayer::new_for_http())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Timeout - 超时返回 408
        .layer(TimeoutLayer::new(Duration::from_millis(
            state.config.request_timeout_ms,
        )))
        // CORS - outermost so preflight and errors carry CORS headers
        .layer(CorsLayer::permissive())
}
