use anyhow::Context;
use pos_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 工作目录, 日志)
    let config = setup_environment().context("Failed to prepare work directory")?;

    print_banner();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "POS server starting...");

    // 2. 初始化服务器状态 (数据库、初始店主账号、设置)
    let state = ServerState::initialize(&config).context("Failed to initialize server state")?;

    // 3. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
