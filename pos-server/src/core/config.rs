use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// 服务器配置 - POS 节点的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、上传文件、日志) |
/// | HTTP_PORT | 5000 | HTTP / WebSocket 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Africa/Addis_Ababa | 业务时区 (订单号日期、日统计) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | EVENT_CHANNEL_CAPACITY | 256 | 每个实时连接的发送队列长度 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | SEED_OWNER_USERNAME | owner | 首次启动创建的店主账号 |
/// | SEED_OWNER_PIN | 1234 | 首次启动创建的店主 PIN |
/// | UPLOAD_MAX_BYTES | 5242880 | 图片上传大小上限 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/pos HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、图片、日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | production
    pub environment: String,
    /// 业务时区
    pub timezone: Tz,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 实时连接发送队列长度
    pub event_channel_capacity: usize,
    pub log_level: String,
    pub log_json: bool,
    pub seed_owner_username: String,
    pub seed_owner_pin: String,
    /// 图片上传大小上限 (字节)
    pub upload_max_bytes: usize,
}

/// 读取并解析环境变量，失败时使用默认值
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|tz| match tz.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    tracing::warn!(timezone = %tz, "Unknown TIMEZONE, falling back to Africa/Addis_Ababa");
                    None
                }
            })
            .unwrap_or(chrono_tz::Africa::Addis_Ababa);

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 5000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone,
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            event_channel_capacity: env_or("EVENT_CHANNEL_CAPACITY", 256),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            seed_owner_username: std::env::var("SEED_OWNER_USERNAME")
                .unwrap_or_else(|_| "owner".into()),
            seed_owner_pin: std::env::var("SEED_OWNER_PIN").unwrap_or_else(|_| "1234".into()),
            upload_max_bytes: env_or("UPLOAD_MAX_BYTES", 5 * 1024 * 1024),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库文件: work_dir/database/pos.redb
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("pos.redb")
    }

    /// 图片目录: work_dir/uploads/images
    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads").join("images")
    }

    /// 日志目录: work_dir/logs
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.images_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_work_dir() {
        let config = Config::with_overrides("/tmp/pos-test", 5055);
        assert_eq!(config.http_port, 5055);
        assert!(config.database_path().ends_with("database/pos.redb"));
        assert!(config.images_dir().starts_with("/tmp/pos-test"));
    }

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("POS_TEST_UNSET_VARIABLE", 42u16), 42);
    }
}
