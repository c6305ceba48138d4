//! CurrentUser Extractor
//!
//! 处理函数直接声明 `user: CurrentUser` 参数即可取得当前用户。

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{CurrentUser, JwtService, authenticate};
use crate::core::ServerState;
use crate::security_log;

/// Reuses the user injected by [`require_auth`](super::require_auth); falls
/// back to validating the bearer token for routes mounted outside it.
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::unauthorized());
            }
        };

        let user = authenticate(state, token)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
