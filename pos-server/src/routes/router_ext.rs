//! Router extension for oneshot calls
//!
//! 不经过网络栈直接调用 Router (集成测试使用)。

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use http::{Request, Response};
use tower::Service;

use crate::core::ServerState;

/// Result type for oneshot API calls
pub type OneshotResult = Result<Response<Body>>;

/// Extension trait for Router to support oneshot calls
///
/// ```ignore
/// let app = build_app(&state);
/// let request = Request::builder().uri("/api/health").body(Body::empty())?;
/// let response = app.clone().oneshot_with(&state, request).await?;
/// ```
#[async_trait::async_trait]
pub trait OneshotRouter {
    async fn oneshot_with(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult;
}

#[async_trait::async_trait]
impl OneshotRouter for Router<ServerState> {
    async fn oneshot_with(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult {
        // Clone router and apply state, then call as Service
        let mut svc = self.clone().with_state(state.clone());
        let response = svc.call(request).await?;
        Ok(response)
    }
}
