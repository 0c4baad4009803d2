//! 请求体与路径参数提取器
//!
//! 解析失败时返回 [`CoreError`]，和其它错误共用同一个 JSON 结构。

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::CoreError;

/// JSON 请求体
pub struct AppJson<T>(pub T);

/// 路径参数
pub struct AppPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("请求体解析失败: {}", rejection);
        CoreError::BadRequest(format!("请求体无效: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for CoreError {
    fn from(rejection: PathRejection) -> Self {
        debug!("路径参数解析失败: {}", rejection);
        CoreError::BadRequest(format!("路径参数无效: {}", rejection.body_text()))
    }
}
