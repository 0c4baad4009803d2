//! 商品业务服务

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use super::model::{CreateProductRequest, NewProduct, Product, ProductPatch, UpdateProductRequest};
use crate::app::sales::model::{NewSale, Sale};
use crate::core::{clock::SharedClock, error::CoreError};
use crate::infrastructure::store::{SharedStore, StoreError};

/// 卖出一件后的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellReceipt {
    pub product: Product,
    pub sale: Sale,
}

#[derive(Clone)]
pub struct ProductService {
    store: SharedStore,
    clock: SharedClock,
}

impl ProductService {
    pub fn new(store: SharedStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        self.store.list_products().await.map_err(|e| {
            error!("读取商品列表失败: {}", e);
            e.into()
        })
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, CoreError> {
        Ok(self.store.get_product(id).await?)
    }

    pub async fn create_product(&self, req: CreateProductRequest) -> Result<Product, CoreError> {
        let req = req.normalized();
        req.validate()?;

        let product = self.store.create_product(NewProduct::from(req)).await?;
        info!(id = %product.id, name = %product.name, "商品已创建");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        mut req: UpdateProductRequest,
    ) -> Result<Product, CoreError> {
        if req.is_empty() {
            return Err(CoreError::BadRequest("没有需要更新的字段".to_string()));
        }

        // 空串表示清空图片，不参与 URL 校验
        let clear_image = req
            .image
            .as_deref()
            .is_some_and(|image| image.trim().is_empty());
        if clear_image {
            req.image = None;
        }
        req.validate()?;

        let mut patch: ProductPatch = req.into_patch();
        if clear_image {
            patch.image = Some(None);
        }

        let product = self.store.update_product(id, patch).await?;
        info!(id = %product.id, "商品已更新");
        Ok(product)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete_product(id).await?;
        info!(%id, "商品已删除");
        Ok(())
    }

    /// 卖出一件：先扣库存，再写销售记录
    ///
    /// 扣库存本身是原子的；两次写入之间互相独立，第二步失败时第一步不会回滚。
    pub async fn sell(&self, id: Uuid) -> Result<SellReceipt, CoreError> {
        let product = self.store.sell_one(id).await.map_err(|e| {
            if matches!(e, StoreError::Backend(_)) {
                error!(%id, "扣减库存失败: {}", e);
            }
            CoreError::from(e)
        })?;

        let sale = self
            .store
            .record_sale(NewSale {
                product_name: product.name.clone(),
                price: product.price,
                date: self.clock.now(),
            })
            .await
            .map_err(|e| {
                error!(%id, "库存已扣减，但销售记录写入失败: {}", e);
                CoreError::from(e)
            })?;

        info!(%id, stock = product.stock, sold = product.sold, price = sale.price, "商品已售出");
        Ok(SellReceipt { product, sale })
    }
}
