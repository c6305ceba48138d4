//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 状态、版本、数据库可达性 | 无 |

use std::sync::OnceLock;
use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// 记录进程启动时间 (服务器启动时调用)
pub fn mark_started() {
    STARTED_AT.get_or_init(Instant::now);
}

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub uptime_seconds: u64,
    /// 当前实时连接数
    pub connections: usize,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let db_ok = state.db.ping();
    let uptime_seconds = STARTED_AT
        .get()
        .map(|t| t.elapsed().as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: if db_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if db_ok { "ok" } else { "error" },
        uptime_seconds,
        connections: state.bus.connection_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_shape() {
        let body = serde_json::to_value(HealthResponse {
            status: "ok",
            version: "0.1.0",
            database: "ok",
            uptime_seconds: 3,
            connections: 0,
        })
        .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");
        assert_eq!(body["uptime_seconds"], 3);
    }
}
