//! 统一响应包装

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 成功响应；错误响应见 [`crate::core::error::ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// 仅列表响应携带
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub request_id: String,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            request_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let mut response = Self::success(items);
        response.count = Some(response.data.len());
        response
    }
}
