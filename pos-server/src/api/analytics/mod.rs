//! Analytics API 模块 (店主)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/analytics", routes())
}

fn routes() -> Router<ServerState> {
    let report_routes = Router::new()
        .route("/today", get(handler::today))
        .route("/period", get(handler::period))
        .route("/waitress/{id}", get(handler::waitress))
        .route("/cancellations", get(handler::cancellations))
        .layer(middleware::from_fn(require_capability(Capability::ViewReports)));

    let review_routes = Router::new()
        .route("/cancellations/{id}/review", post(handler::review_cancellation))
        .layer(middleware::from_fn(require_capability(
            Capability::ReviewCancellations,
        )));

    report_routes.merge(review_routes)
}
