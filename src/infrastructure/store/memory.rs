//! 内存存储，用于本地开发和测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{path::Path, sync::RwLock};
use tracing::info;
use uuid::Uuid;

use super::{ProductStore, SaleStore, Store, StoreError};
use crate::app::products::model::{NewProduct, Product, ProductPatch, ProductRecord};
use crate::app::sales::model::{NewSale, Sale, SaleRecord};
use crate::core::clock::SharedClock;

#[derive(Default)]
struct Collections {
    products: Vec<Product>,
    sales: Vec<Sale>,
}

/// 种子文件格式：导出的原始文档
#[derive(Debug, Default, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
}

pub struct MemoryStore {
    inner: RwLock<Collections>,
    clock: SharedClock,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("内存存储锁已损坏".to_string())
}

impl MemoryStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
            clock,
        }
    }

    /// 导入原始文档，逐条归一化
    pub fn import(&self, seed: SeedDocument) -> Result<(usize, usize), StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.write().map_err(poisoned)?;

        let products: Vec<Product> = seed.products.into_iter().map(|r| r.normalize(now)).collect();
        let sales: Vec<Sale> = seed.sales.into_iter().map(SaleRecord::normalize).collect();
        let counts = (products.len(), sales.len());

        inner.products.extend(products);
        inner.sales.extend(sales);
        Ok(counts)
    }

    pub fn seed_from_file(&self, path: impl AsRef<Path>) -> Result<(usize, usize), StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;
        let seed: SeedDocument = serde_json::from_str(&content)
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;

        let counts = self.import(seed)?;
        info!(
            products = counts.0,
            sales = counts.1,
            "已从 {} 导入种子数据",
            path.display()
        );
        Ok(counts)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.products.clone())
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let now = self.clock.now();
        let product = Product {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            category: new.category,
            price: new.price,
            stock: new.stock,
            sold: 0,
            image: new.image,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.write().map_err(poisoned)?;
        let product = inner
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        patch.apply_to(product, now);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);

        if inner.products.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn sell_one(&self, id: Uuid) -> Result<Product, StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.write().map_err(poisoned)?;
        let product = inner
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if product.stock == 0 {
            return Err(StoreError::OutOfStock(product.name.clone()));
        }
        product.stock -= 1;
        product.sold = product.sold.saturating_add(1);
        product.updated_at = now;
        Ok(product.clone())
    }
}

#[async_trait]
impl SaleStore for MemoryStore {
    async fn record_sale(&self, new: NewSale) -> Result<Sale, StoreError> {
        let sale = Sale {
            id: Uuid::new_v4(),
            product_name: new.product_name,
            price: new.price,
            date: Some(new.date),
        };

        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.sales.push(sale.clone());
        Ok(sale)
    }

    async fn list_sales_since(&self, since: DateTime<Utc>) -> Result<Vec<Sale>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .sales
            .iter()
            .filter(|s| s.date.is_some_and(|d| d >= since))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.read().map(|_| ()).map_err(poisoned)
    }
}
