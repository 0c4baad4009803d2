//! 仪表盘视图模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// 收入图表的时间窗口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartRange {
    #[default]
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl ChartRange {
    pub fn days(self) -> u32 {
        match self {
            ChartRange::SevenDays => 7,
            ChartRange::ThirtyDays => 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartRange::SevenDays => "7d",
            ChartRange::ThirtyDays => "30d",
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" | "7" => Ok(ChartRange::SevenDays),
            "30d" | "30" => Ok(ChartRange::ThirtyDays),
            other => Err(format!("不支持的时间窗口: {}，可选 7d 或 30d", other)),
        }
    }
}

/// 某一天的收入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    /// "Jan 5" 形式的日期标签
    pub date: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPoint {
    pub name: String,
    pub in_stock: u32,
    pub sold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Σ 单价 × 库存
    pub inventory_value: f64,
    pub product_count: usize,
    /// Σ 已售数量
    pub units_sold: u64,
    pub low_stock_count: usize,
    /// Σ 单价 × 已售数量
    pub sales_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub id: Uuid,
    pub name: String,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub range: ChartRange,
    pub generated_at: DateTime<Utc>,
    pub kpis: Kpis,
    pub revenue: Vec<RevenuePoint>,
    pub stock_vs_sold: Vec<StockPoint>,
    pub categories: Vec<CategorySlice>,
    pub low_stock: Vec<LowStockItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
}
