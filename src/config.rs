use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// 销售回溯天数上限（十年）
pub const MAX_SALES_LOOKBACK_DAYS: u32 = 3650;
/// 会话有效期上限（三十天）
pub const MAX_SESSION_TTL_MINUTES: i64 = 30 * 24 * 60;

/// 服务配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 会话配置
    pub auth: AuthConfig,
    /// 图片托管配置
    pub media: MediaConfig,
    /// 统计配置
    pub analytics: AnalyticsConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
    /// 是否允许任意来源跨域
    pub cors_allow_any: bool,
    /// 请求体上限（字节），上传图片受此限制
    pub body_limit_bytes: usize,
}

/// 数据库配置；未设置 url 时使用内存存储
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// 内存存储的种子文件
    pub seed_path: Option<PathBuf>,
}

/// 会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 签名密钥，至少 16 字节
    pub session_secret: String,
    /// 续签令牌的有效期（分钟）
    pub session_ttl_minutes: i64,
}

/// 图片托管配置，三项凭据缺一则禁用上传
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base: String,
    pub timeout_seconds: u64,
}

/// 统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 读取销售记录时向前回溯的天数
    pub sales_lookback_days: u32,
    /// 按日分桶时使用的时区偏移（分钟）
    pub utc_offset_minutes: i32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
    /// 设置后额外按天滚动写入文件
    pub log_dir: Option<PathBuf>,
    /// 日志文件名前缀
    pub file_prefix: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            timeout_seconds: 30,
            cors_allow_any: true,
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 20,
            min_connections: 1,
            acquire_timeout_seconds: 8,
            seed_path: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            session_ttl_minutes: 720,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            api_base: "https://api.cloudinary.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            sales_lookback_days: 7,
            utc_offset_minutes: 0,
        }
    }
}

impl AnalyticsConfig {
    /// 分桶用的时区偏移；超出范围时回退到 UTC
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// 销售回溯窗口，超过上限按上限计
    pub fn lookback(&self) -> Duration {
        lookback_window(self.sales_lookback_days)
    }
}

/// 回溯天数转为时长，最多 `MAX_SALES_LOOKBACK_DAYS` 天
pub fn lookback_window(days: u32) -> Duration {
    Duration::days(i64::from(days.min(MAX_SALES_LOOKBACK_DAYS)))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "stockroom".to_string(),
        }
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite(e.to_string()))?;
        }

        fs::write(path.as_ref(), content).map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// 用环境变量覆盖，密钥类配置通常只放在环境变量里
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(secret) = non_empty("SESSION_SECRET") {
            self.auth.session_secret = secret;
        }
        if let Some(cloud) = non_empty("CLOUDINARY_CLOUD_NAME") {
            self.media.cloud_name = Some(cloud);
        }
        if let Some(key) = non_empty("CLOUDINARY_API_KEY") {
            self.media.api_key = Some(key);
        }
        if let Some(secret) = non_empty("CLOUDINARY_API_SECRET") {
            self.media.api_secret = Some(secret);
        }
        if let Some(port) = non_empty("PORT") {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Validation(format!("无效的 PORT: {}", port)))?;
        }

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation("HTTP端口必须大于0".to_string()));
        }
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("绑定地址不能为空".to_string()));
        }
        self.socket_addr()?;

        if self.auth.session_secret.len() < 16 {
            return Err(ConfigError::Validation(
                "会话密钥至少需要 16 字节 (SESSION_SECRET)".to_string(),
            ));
        }
        if self.auth.session_ttl_minutes <= 0
            || self.auth.session_ttl_minutes > MAX_SESSION_TTL_MINUTES
        {
            return Err(ConfigError::Validation(format!(
                "会话有效期必须在 1 到 {} 分钟之间",
                MAX_SESSION_TTL_MINUTES
            )));
        }

        if self.analytics.sales_lookback_days == 0
            || self.analytics.sales_lookback_days > MAX_SALES_LOOKBACK_DAYS
        {
            return Err(ConfigError::Validation(format!(
                "销售回溯天数必须在 1 到 {} 之间",
                MAX_SALES_LOOKBACK_DAYS
            )));
        }
        if self.analytics.utc_offset_minutes.unsigned_abs() > 14 * 60 {
            return Err(ConfigError::Validation(format!(
                "时区偏移超出范围: {} 分钟",
                self.analytics.utc_offset_minutes
            )));
        }

        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            return Err(ConfigError::Validation("数据库连接数配置无效".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http.bind_address, self.http.port)
            .parse()
            .map_err(|e| ConfigError::Validation(format!("无效的监听地址: {}", e)))
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("文件读取错误: {0}")]
    FileRead(String),
    #[error("文件写入错误: {0}")]
    FileWrite(String),
    #[error("配置解析错误: {0}")]
    Parse(String),
    #[error("配置序列化错误: {0}")]
    Serialize(String),
    #[error("配置验证错误: {0}")]
    Validation(String),
}

/// 从文件或默认值加载配置，再叠加环境变量并校验
pub fn load_config() -> Result<Config, ConfigError> {
    let explicit = std::env::var("STOCKROOM_CONFIG").ok().map(PathBuf::from);
    let candidates: Vec<PathBuf> = match explicit {
        Some(path) => vec![path],
        None => vec![
            PathBuf::from("config.toml"),
            PathBuf::from("./config/config.toml"),
        ],
    };

    let mut config = match candidates.iter().find(|p| p.exists()) {
        Some(path) => {
            // 日志系统依赖配置，此时还未初始化
            println!("从配置文件加载: {}", path.display());
            Config::load_from_file(path)?
        }
        None => {
            println!("未找到配置文件，使用默认配置");
            Config::default()
        }
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
