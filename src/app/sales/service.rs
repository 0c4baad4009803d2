//! 销售业务服务

use tracing::{error, info};
use validator::Validate;

use super::model::{NewSale, RecordSaleRequest, Sale};
use crate::app::normalize::non_blank;
use crate::app::products::model::UNKNOWN_NAME;
use crate::config::lookback_window;
use crate::core::{clock::SharedClock, error::CoreError};
use crate::infrastructure::store::SharedStore;

#[derive(Clone)]
pub struct SaleService {
    store: SharedStore,
    clock: SharedClock,
    lookback_days: u32,
}

impl SaleService {
    pub fn new(store: SharedStore, clock: SharedClock, lookback_days: u32) -> Self {
        Self {
            store,
            clock,
            lookback_days,
        }
    }

    /// 记录一次销售，日期取当前时刻
    pub async fn record_sale(&self, req: RecordSaleRequest) -> Result<Sale, CoreError> {
        req.validate()?;
        if !req.price.is_finite() {
            return Err(CoreError::BadRequest("价格必须是有效数字".to_string()));
        }

        let sale = self
            .store
            .record_sale(NewSale {
                product_name: non_blank(req.product_name)
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                price: req.price,
                date: self.clock.now(),
            })
            .await?;

        info!(id = %sale.id, product = %sale.product_name, price = sale.price, "销售已记录");
        Ok(sale)
    }

    /// 回溯窗口内的销售
    pub async fn recent_sales(&self) -> Result<Vec<Sale>, CoreError> {
        let since = self.clock.now() - lookback_window(self.lookback_days);
        self.store.list_sales_since(since).await.map_err(|e| {
            error!("读取销售记录失败: {}", e);
            e.into()
        })
    }
}
