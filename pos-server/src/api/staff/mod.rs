//! Staff API 模块 (店主)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/reset-pin", post(handler::reset_pin))
        .route("/{id}/deactivate", post(handler::deactivate))
        .layer(middleware::from_fn(require_capability(Capability::ManageStaff)))
}
