//! Server Implementation
//!
//! HTTP / WebSocket 服务器启动和优雅关闭

use tokio::net::TcpListener;

use crate::api::health;
use crate::core::{Config, Result, ServerError, ServerState};
use crate::routes::build_app;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for sharing with oneshot)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// 监听端口直到 Ctrl-C
    ///
    /// 收到关闭信号后先关闭所有实时会话，再等待进行中的 HTTP 请求结束。
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        health::mark_started();
        let app = build_app(&state).with_state(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            addr = %addr,
            environment = %self.config.environment,
            timezone = %self.config.timezone,
            "POS server listening"
        );

        let bus = state.bus.clone();
        let shutdown = async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down...");
            bus.shutdown();
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Io)?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
