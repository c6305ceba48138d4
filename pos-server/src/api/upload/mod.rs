//! Upload Routes
//!
//! 图片上传 (店主) 和公开的图片读取。

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

/// Multipart 包头余量
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build upload router
///
/// `max_bytes` 是单张图片上限，请求体上限在此基础上放宽。
pub fn router(max_bytes: usize) -> Router<ServerState> {
    let upload_routes = Router::new()
        .route("/api/upload/image", post(handler::upload))
        .layer(DefaultBodyLimit::max(max_bytes + MULTIPART_OVERHEAD))
        .layer(middleware::from_fn(require_capability(Capability::UploadImages)));

    // Serve uploaded images - public access
    let serve_routes = Router::new().route("/api/image/{filename}", get(handler::serve));

    upload_routes.merge(serve_routes)
}
