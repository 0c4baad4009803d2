//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::infrastructure::{media::MediaError, store::StoreError};

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    BadRequest(String),
    #[error("未认证")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("上游服务失败: {0}")]
    Upstream(String),
    #[error("{0}")]
    InternalServerError(String),
}

/// 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CoreError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            CoreError::BadRequest(_) => "BAD_REQUEST",
            CoreError::Unauthorized => "UNAUTHORIZED",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Upstream(_) => "UPSTREAM_FAILURE",
            CoreError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let user_message = match &self {
            CoreError::Unauthorized => "认证失败，请提供有效的会话令牌".to_string(),
            // 内部细节只写日志，不返回给调用方
            CoreError::InternalServerError(msg) => {
                error!("内部错误: {}", msg);
                "服务器内部错误".to_string()
            }
            other => other.to_string(),
        };

        let error_response = ErrorResponse {
            error: self.kind().to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CoreError::NotFound(format!("记录 {} 不存在", id)),
            StoreError::OutOfStock(name) => CoreError::Conflict(format!("商品 {} 已无库存", name)),
            other => {
                error!("存储错误: {}", other);
                CoreError::Upstream(other.to_string())
            }
        }
    }
}

impl From<MediaError> for CoreError {
    fn from(err: MediaError) -> Self {
        error!("图片上传失败: {}", err);
        match err {
            MediaError::NotConfigured => CoreError::InternalServerError(err.to_string()),
            other => CoreError::Upstream(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("字段 {} 无效", field))
                })
            })
            .collect();
        messages.sort();

        CoreError::BadRequest(messages.join(", "))
    }
}
