//! 基础设施：存储、图片托管与日志

#[cfg(feature = "postgres")]
pub mod database;
pub mod logger;
pub mod media;
pub mod store;
