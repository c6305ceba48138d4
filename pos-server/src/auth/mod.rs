//! 认证授权模块
//!
//! 提供 JWT 认证、按角色授权和中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文 (每次请求从员工表重新加载)
//! - [`Capability`] - 角色授权表
//! - [`require_auth`] - 认证中间件
//! - [`require_capability`] - 授权检查中间件
//! - [`pin`] - argon2 PIN 哈希

pub mod capabilities;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod pin;

pub use capabilities::Capability;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{authenticate, require_auth, require_capability};
