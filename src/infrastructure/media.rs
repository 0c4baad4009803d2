//! 图片托管服务客户端
//!
//! 只负责把二进制内容转交给托管服务并拿回公开 URL，不校验类型和大小。

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::config::MediaConfig;
use crate::core::clock::SharedClock;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("图片托管服务未配置")]
    NotConfigured,
    #[error("上传请求失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("图片托管服务返回 {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("图片托管服务响应缺少 secure_url")]
    MissingUrl,
}

/// 待上传的文件
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// 上传并返回持久的公开 URL
    async fn upload(&self, file: UploadFile) -> Result<String, MediaError>;
}

pub type SharedMediaHost = Arc<dyn MediaHost>;

/// 未配置凭据时使用，所有上传都失败
#[derive(Debug, Default)]
pub struct DisabledMediaHost;

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(&self, _file: UploadFile) -> Result<String, MediaError> {
        warn!("收到上传请求，但图片托管服务未配置");
        Err(MediaError::NotConfigured)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Cloudinary 签名上传
pub struct CloudinaryHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
    clock: SharedClock,
}

impl CloudinaryHost {
    pub fn new(
        api_base: &str,
        cloud_name: &str,
        api_key: String,
        api_secret: String,
        timeout: Duration,
        clock: SharedClock,
    ) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            upload_url: format!(
                "{}/v1_1/{}/auto/upload",
                api_base.trim_end_matches('/'),
                cloud_name
            ),
            api_key,
            api_secret,
            clock,
        })
    }

    /// 凭据齐全时构建 Cloudinary 客户端，否则返回禁用实现
    pub fn from_config(config: &MediaConfig, clock: SharedClock) -> Result<SharedMediaHost, MediaError> {
        match (&config.cloud_name, &config.api_key, &config.api_secret) {
            (Some(cloud), Some(key), Some(secret)) => {
                let host = Self::new(
                    &config.api_base,
                    cloud,
                    key.clone(),
                    secret.clone(),
                    Duration::from_secs(config.timeout_seconds),
                    clock,
                )?;
                info!("图片托管服务: {}", host.upload_url);
                Ok(Arc::new(host))
            }
            _ => {
                warn!("未配置图片托管凭据，上传功能不可用");
                Ok(Arc::new(DisabledMediaHost))
            }
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

/// 按参数名排序拼接 `k=v&k=v`
pub fn string_to_sign(params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// 上传签名：sha1(参数串 + api_secret) 的十六进制
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// 客户端声明的类型无法解析时丢弃，由托管服务自行识别
fn usable_content_type(content_type: Option<String>) -> Option<String> {
    content_type.filter(|value| {
        let usable = Part::bytes(Vec::new()).mime_str(value).is_ok();
        if !usable {
            warn!(content_type = %value, "忽略无法解析的 Content-Type");
        }
        usable
    })
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, file: UploadFile) -> Result<String, MediaError> {
        let timestamp = self.clock.now().timestamp().to_string();
        let signature = sign(&[("timestamp", timestamp.clone())], &self.api_secret);
        let size = file.bytes.len();

        let mut part = Part::bytes(file.bytes)
            .file_name(file.file_name.unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = usable_content_type(file.content_type) {
            part = part.mime_str(&content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self.client.post(&self.upload_url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: UploadResponse = response.json().await?;
        let url = body.secure_url.ok_or(MediaError::MissingUrl)?;
        info!(bytes = size, %url, "图片已上传");
        Ok(url)
    }
}
