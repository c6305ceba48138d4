//! POS Server - 餐厅点单系统节点
//!
//! # 架构概述
//!
//! - **订单引擎** (`orders`): 下单、宽限期编辑、出品状态、作废分级、收款找零
//! - **数据库** (`db`): 嵌入式 redb 存储，所有读-改-写都在单个写事务内完成
//! - **认证** (`auth`): JWT + Argon2 PIN，能力表授权
//! - **实时推送** (`message`): 按房间投递的 WebSocket 广播
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT 认证、能力表
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由装配与中间件
//! ├── db/            # redb 存储与仓库
//! ├── orders/        # 订单生命周期引擎
//! ├── analytics/     # 日统计与报表
//! ├── message/       # 房间广播
//! ├── services/      # 库存账本、图片存储
//! └── utils/         # 日志、时区、校验
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod orders;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{BroadcastPort, RoomBus};
pub use orders::{OrderStorage, OrdersManager};
pub use routes::{build_app, build_router};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 进程启动准备：加载 `.env`、创建工作目录、初始化日志
pub fn setup_environment() -> std::io::Result<Config> {
    // .env 不存在是正常情况
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        log_dir.to_str(),
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
