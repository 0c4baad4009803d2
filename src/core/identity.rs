//! 请求级身份
//!
//! 每个受保护的处理器都显式接收 [`Identity`]，没有全局的登录状态。

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::CoreError;
use crate::app::auth::service::SessionKeys;

/// 已认证的调用方
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(CoreError::Unauthorized)?;
        let keys = SessionKeys::from_ref(state);

        keys.verify(token).map_err(|e| {
            debug!("会话令牌校验失败: {}", e);
            CoreError::Unauthorized
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
