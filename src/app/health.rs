//! 健康检查

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub store: String,
    pub store_reachable: bool,
    pub timestamp: String,
}

/// 存储不可达时返回 503，便于负载均衡摘除实例
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let reachable = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("健康检查：存储不可达: {}", e);
            false
        }
    };

    let (code, status) = if reachable {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: state.store.backend().to_string(),
            store_reachable: reachable,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}
