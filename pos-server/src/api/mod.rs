//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录 / 校验 / 登出
//! - [`staff`] - 员工管理
//! - [`categories`] - 分类管理
//! - [`add_ons`] - 加料管理
//! - [`menu_items`] - 菜单与库存
//! - [`orders`] - 订单生命周期
//! - [`payments`] - 收款与日收款
//! - [`settings`] - 餐厅设置
//! - [`analytics`] - 报表与作废审核
//! - [`upload`] - 图片上传与读取
//! - [`ws`] - 实时 WebSocket 通道
//!
//! 每个子模块提供 `router()`，授权通过
//! [`require_capability`](crate::auth::require_capability) 在路由层声明。

pub mod add_ons;
pub mod analytics;
pub mod auth;
pub mod categories;
pub mod health;
pub mod menu_items;
pub mod orders;
pub mod payments;
pub mod settings;
pub mod staff;
pub mod upload;
pub mod ws;

use axum::Json;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppError, AppResult};

/// Handler 返回类型：统一 `{success, code, message, data}` 包装
pub type ApiResult<T> = AppResult<Json<ApiResponse<T>>>;
