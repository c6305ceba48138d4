//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ApiResponse`] - API 响应结构 (from shared::error)
//! - 日志、业务时区、输入校验

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, FieldError};

/// 包装成功响应
pub fn ok<T: serde::Serialize>(data: T) -> axum::Json<ApiResponse<T>> {
    axum::Json(ApiResponse::success(data))
}

/// 包装带消息的成功响应
pub fn ok_with_message<T: serde::Serialize>(
    data: T,
    message: impl Into<String>,
) -> axum::Json<ApiResponse<T>> {
    axum::Json(ApiResponse::success_with_message(message, data))
}
