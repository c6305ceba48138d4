//! 认证中间件
//!
//! 为 JWT 认证和能力表授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::ErrorCode;

use crate::AppError;
use crate::auth::{Capability, CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 无需认证的 API 路径
fn is_public_api_route(path: &str) -> bool {
    path == "/api/auth/login"
        || path == "/api/health"
        // WebSocket 通过 query 中的 token 自行认证
        || path == "/api/ws"
        || path.starts_with("/api/image/")
}

/// 校验令牌并重新加载员工记录
///
/// 角色和启用状态以数据库为准，令牌只提供员工 ID。
pub fn authenticate(state: &ServerState, token: &str) -> Result<CurrentUser, AppError> {
    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = format!("{}", e));
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let record = state.staff.find_by_id(&claims.sub)?.ok_or_else(|| {
        security_log!("WARN", "auth_unknown_user", user_id = claims.sub.clone());
        AppError::invalid_token("Account no longer exists")
    })?;

    if !record.profile.active {
        security_log!(
            "WARN",
            "auth_inactive_user",
            user_id = record.profile.id.clone(),
            username = record.profile.username.clone()
        );
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    Ok(CurrentUser::from(&record.profile))
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - `/api/auth/login`, `/api/health`, `/api/ws`, `/api/image/*`
///
/// # 错误处理
///
/// | 错误 | 错误码 |
/// |------|--------|
/// | 无 Authorization 头 | NotAuthenticated |
/// | 令牌过期 | TokenExpired |
/// | 无效令牌 / 账号不存在 | TokenInvalid |
/// | 账号已停用 | AccountDisabled |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") || is_public_api_route(path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let user = authenticate(&state, token)?;
    req.extensions_mut().insert(user.clone());

    // 回写到响应扩展，供外层请求日志使用
    let mut response = next.run(req).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// 能力检查中间件
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_capability(Capability::CreateOrder)));
/// ```
///
/// # 错误
///
/// 角色不在能力表中返回 403 PermissionDenied
pub fn require_capability(
    capability: Capability,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !capability.allows(user.role) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    username = user.username.clone(),
                    role = user.role.as_str(),
                    capability = capability.to_string()
                );
                return Err(AppError::forbidden(format!(
                    "Role '{}' is not allowed to perform {}",
                    user.role, capability
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes() {
        assert!(is_public_api_route("/api/auth/login"));
        assert!(is_public_api_route("/api/health"));
        assert!(is_public_api_route("/api/image/abc.jpg"));
        assert!(!is_public_api_route("/api/auth/verify"));
        assert!(!is_public_api_route("/api/orders"));
    }
}
