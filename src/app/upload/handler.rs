//! 图片上传处理器

use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::core::{error::CoreError, identity::Identity};
use crate::infrastructure::media::UploadFile;

/// 表单中文件字段的名称
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub links: Vec<String>,
}

/// 把 `file` 字段转交给图片托管服务，返回 `{ "links": [url] }`
pub async fn upload_image(
    State(state): State<AppState>,
    identity: Identity,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, CoreError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CoreError::BadRequest(format!("无效的表单数据: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| CoreError::BadRequest(format!("读取上传文件失败: {}", e)))?;

        upload = Some(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = upload.ok_or_else(|| CoreError::BadRequest("缺少 file 字段".to_string()))?;
    info!(
        subject = %identity.subject,
        bytes = file.bytes.len(),
        file_name = file.file_name.as_deref().unwrap_or("-"),
        "收到图片上传"
    );

    let url = state.media.upload(file).await?;
    Ok(Json(UploadResponse { links: vec![url] }))
}
