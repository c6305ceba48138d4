//! Authentication Handlers
//!
//! Handles login, token verification and logout

use std::time::Duration;

use axum::{Json, extract::State};
use shared::models::{LoginRequest, LoginResponse, StaffProfile};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::validation::validate;
use crate::utils::{AppError, ErrorCode, ok, ok_with_message};

/// 固定登录延迟 (毫秒)，成功与失败耗时一致
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// 用户名 + 4 位 PIN 登录，返回 JWT 和员工资料。
/// 用户名不存在和 PIN 错误返回同一条消息。
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    validate(&req)?;
    let username = req.username.trim().to_lowercase();

    let record = state.staff.find_by_username(&username)?;

    // Fixed delay before any outcome is revealed
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let record = match record {
        Some(record) if record.verify_pin(&req.pin) => record,
        _ => {
            security_log!("WARN", "login_failed", username = username.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    if !record.profile.active {
        security_log!(
            "WARN",
            "login_inactive",
            username = username.clone(),
            user_id = record.profile.id.clone()
        );
        return Err(AppError::with_message(
            ErrorCode::AccountDisabled,
            "Account is deactivated. Contact the owner.",
        ));
    }

    let token = state.jwt_service.generate_token(&record.profile.id)?;
    let user = state.staff.record_login(&record.profile.id)?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(ok_with_message(
        LoginResponse { token, user },
        "Login successful",
    ))
}

/// Verify handler - 返回当前令牌对应的员工资料
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> ApiResult<StaffProfile> {
    let record = state
        .staff
        .find_by_id(&user.id)?
        .ok_or_else(|| AppError::invalid_token("Account no longer exists"))?;
    Ok(ok(record.profile))
}

/// Logout handler
///
/// 令牌无状态，客户端丢弃即可，这里只记录日志。
pub async fn logout(user: CurrentUser) -> ApiResult<()> {
    tracing::info!(user_id = %user.id, username = %user.username, "User logged out");
    Ok(ok_with_message((), "Logged out successfully"))
}
