//! Payment API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    let process_routes = Router::new()
        .route("/", post(handler::process))
        .layer(middleware::from_fn(require_capability(Capability::ProcessPayment)));

    let report_routes = Router::new()
        .route("/daily", get(handler::daily))
        .layer(middleware::from_fn(require_capability(
            Capability::ViewDailyPayments,
        )));

    process_routes.merge(report_routes)
}
