//! 会话处理器

use axum::{extract::State, response::Json};
use tracing::info;

use super::model::SessionToken;
use crate::app::AppState;
use crate::core::{error::CoreError, identity::Identity, response::ApiResponse};

/// 当前会话
pub async fn get_session(identity: Identity) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::success(identity))
}

/// 为当前身份续签令牌
pub async fn refresh_session(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ApiResponse<SessionToken>>, CoreError> {
    let session = state
        .sessions
        .issue(&identity, state.clock.now())
        .map_err(|e| CoreError::InternalServerError(format!("续签令牌失败: {}", e)))?;

    info!(subject = %identity.subject, expires_at = %session.expires_at, "会话已续签");
    Ok(Json(ApiResponse::success(session)))
}
