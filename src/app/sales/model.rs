//! 销售记录数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::app::normalize::{lenient_amount, non_blank, parse_timestamp};
use crate::app::products::model::UNKNOWN_NAME;

/// 一次售出记录
///
/// `product_name` 是冗余拷贝，不关联商品 id。`date` 为 `None` 表示原始
/// 时间无法解析，统计时会被跳过。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub product_name: String,
    pub price: f64,
    pub date: Option<DateTime<Utc>>,
}

/// 持久化层返回的原始销售文档
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<Value>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
}

impl SaleRecord {
    pub fn normalize(self) -> Sale {
        let id = match &self.id {
            Some(Value::String(s)) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
        .unwrap_or_else(Uuid::new_v4);

        Sale {
            id,
            product_name: non_blank(self.product_name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            price: lenient_amount(self.price.as_ref()),
            date: parse_timestamp(self.date.as_ref()),
        }
    }
}

/// 记录销售请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "商品名称不能超过 200 个字符"))]
    pub product_name: Option<String>,

    #[validate(range(min = 0.0, message = "价格不能为负数"))]
    pub price: f64,
}

/// 新销售（存储层输入），日期由写入时刻决定
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub product_name: String,
    pub price: f64,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_sale_record_degrades_to_defaults() {
        let record: SaleRecord = serde_json::from_value(json!({
            "price": "oops",
            "date": "yesterday-ish"
        }))
        .unwrap();

        let sale = record.normalize();
        assert_eq!(sale.product_name, UNKNOWN_NAME);
        assert_eq!(sale.price, 0.0);
        assert_eq!(sale.date, None);
    }

    #[test]
    fn sale_record_with_epoch_millis() {
        let record: SaleRecord = serde_json::from_value(json!({
            "productName": "Mug",
            "price": 12,
            "date": 1_704_067_200_000i64
        }))
        .unwrap();

        let sale = record.normalize();
        assert_eq!(sale.product_name, "Mug");
        assert_eq!(sale.price, 12.0);
        assert_eq!(sale.date.map(|d| d.to_rfc3339()), Some("2024-01-01T00:00:00+00:00".to_string()));
    }
}
