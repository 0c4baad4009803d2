//! # Stockroom
//!
//! 库存管理后台服务：
//! - 商品目录的增删改查与"卖出一件"
//! - 销售记录
//! - 仪表盘统计（KPI、收入曲线、库存对比、分类分布、低库存清单）
//! - 商品图片上传
//!
//! 存储后端可选 PostgreSQL 或内存（可从 JSON 文档导入种子数据）。

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::{router, AppState};
pub use config::Config;
