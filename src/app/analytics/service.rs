//! 仪表盘业务服务

use tracing::{error, info, warn};

use super::{
    aggregator,
    model::{ChartRange, Dashboard},
};
use crate::config::AnalyticsConfig;
use crate::core::{clock::SharedClock, error::CoreError};
use crate::infrastructure::store::SharedStore;

#[derive(Clone)]
pub struct DashboardService {
    store: SharedStore,
    clock: SharedClock,
    config: AnalyticsConfig,
}

impl DashboardService {
    pub fn new(store: SharedStore, clock: SharedClock, config: AnalyticsConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// 并发读取商品和销售后聚合；任一读取失败则整体失败，不返回部分结果
    pub async fn dashboard(&self, range: ChartRange) -> Result<Dashboard, CoreError> {
        let now = self.clock.now();
        let lookback = self.config.sales_lookback_days;
        if range.days() > lookback {
            warn!(
                range = %range,
                lookback_days = lookback,
                "图表窗口大于销售回溯天数，较早的日期将显示为 0"
            );
        }

        let since = now - self.config.lookback();
        let (products, sales) = tokio::try_join!(
            self.store.list_products(),
            self.store.list_sales_since(since)
        )
        .map_err(|e| {
            error!("仪表盘数据读取失败: {}", e);
            CoreError::from(e)
        })?;

        let dashboard =
            aggregator::build_dashboard(&products, &sales, range, now, self.config.offset());

        info!(
            range = %range,
            products = products.len(),
            sales = sales.len(),
            "仪表盘已生成"
        );
        Ok(dashboard)
    }
}
