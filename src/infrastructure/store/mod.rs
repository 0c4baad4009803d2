//! 持久化接口
//!
//! 商品和销售是两组独立的集合，之间没有事务保证。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::products::model::{NewProduct, Product, ProductPatch};
use crate::app::sales::model::{NewSale, Sale};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("记录不存在: {0}")]
    NotFound(String),
    #[error("商品 {0} 已无库存")]
    OutOfStock(String),
    #[error("存储后端错误: {0}")]
    Backend(String),
    #[error("种子数据无效: {0}")]
    Seed(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 按创建顺序返回全部商品
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError>;
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, StoreError>;
    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError>;
    /// 原子地库存减一、销量加一；库存为 0 时返回 `OutOfStock`
    async fn sell_one(&self, id: Uuid) -> Result<Product, StoreError>;
}

#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn record_sale(&self, new: NewSale) -> Result<Sale, StoreError>;
    /// `date >= since` 的销售，无日期的记录不返回
    async fn list_sales_since(&self, since: DateTime<Utc>) -> Result<Vec<Sale>, StoreError>;
}

#[async_trait]
pub trait Store: ProductStore + SaleStore {
    fn backend(&self) -> &'static str;
    async fn ping(&self) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn Store>;
