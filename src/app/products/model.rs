//! 商品数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::app::normalize::{lenient_amount, lenient_count, non_blank, parse_timestamp};

pub const DEFAULT_CATEGORY: &str = "Other";
pub const UNKNOWN_NAME: &str = "Unknown";

/// 归一化后的商品，所有字段都已填充
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub stock: u32,
    pub sold: u32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 持久化层返回的原始商品文档
///
/// 旧数据里可能只有 `title` 没有 `name`，数字可能存成字符串，
/// 所以这里全部按可选的原始值接收。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub stock: Option<Value>,
    #[serde(default)]
    pub sold: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
}

impl ProductRecord {
    /// 入库时只做一次的归一化
    pub fn normalize(self, now: DateTime<Utc>) -> Product {
        let id = match &self.id {
            Some(Value::String(s)) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
        .unwrap_or_else(Uuid::new_v4);
        let created_at = parse_timestamp(self.created_at.as_ref()).unwrap_or(now);
        let updated_at = parse_timestamp(self.updated_at.as_ref()).unwrap_or(created_at);

        Product {
            id,
            name: display_name(self.name, self.title),
            description: non_blank(self.description),
            category: category_or_default(self.category),
            price: lenient_amount(self.price.as_ref()),
            stock: lenient_count(self.stock.as_ref()),
            sold: lenient_count(self.sold.as_ref()),
            image: non_blank(self.image),
            created_at,
            updated_at,
        }
    }
}

/// name，其次 title，都没有时为 "Unknown"
pub fn display_name(name: Option<String>, title: Option<String>) -> String {
    non_blank(name)
        .or_else(|| non_blank(title))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

pub fn category_or_default(category: Option<String>) -> String {
    non_blank(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("商品名称不能为空".into());
        return Err(err);
    }
    Ok(())
}

/// 创建商品请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(
        length(max = 200, message = "商品名称不能超过 200 个字符"),
        custom(function = "not_blank")
    )]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[validate(range(min = 0.0, message = "价格不能为负数"))]
    pub price: f64,

    #[validate(range(min = 0, max = 1_000_000_000, message = "库存必须是非负整数"))]
    pub stock: i64,

    #[serde(default)]
    #[validate(url(message = "图片地址必须是有效的 URL"))]
    pub image: Option<String>,
}

impl CreateProductRequest {
    /// 表单里的空串当作未填写
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = non_blank(self.description);
        self.category = non_blank(self.category);
        self.image = non_blank(self.image);
        self
    }
}

/// 更新商品请求，只更新提供的字段
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(
        length(max = 200, message = "商品名称不能超过 200 个字符"),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    pub description: Option<String>,

    pub category: Option<String>,

    #[validate(range(min = 0.0, message = "价格不能为负数"))]
    pub price: Option<f64>,

    #[validate(range(min = 0, max = 1_000_000_000, message = "库存必须是非负整数"))]
    pub stock: Option<i64>,

    #[validate(range(min = 0, max = 1_000_000_000, message = "销量必须是非负整数"))]
    pub sold: Option<i64>,

    #[validate(url(message = "图片地址必须是有效的 URL"))]
    pub image: Option<String>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.sold.is_none()
            && self.image.is_none()
    }

    /// 校验通过后转成存储层的补丁
    pub fn into_patch(self) -> ProductPatch {
        ProductPatch {
            name: self.name.map(|n| n.trim().to_string()),
            // 空串表示清空
            description: self.description.map(|d| non_blank(Some(d))),
            category: self.category.map(|c| category_or_default(Some(c))),
            price: self.price,
            stock: self.stock.map(clamp_count),
            sold: self.sold.map(clamp_count),
            image: self.image.map(|i| non_blank(Some(i))),
        }
    }
}

pub(crate) fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// 新商品（存储层输入）
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub stock: u32,
    pub image: Option<String>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        let req = req.normalized();
        Self {
            name: req.name,
            description: req.description,
            category: category_or_default(req.category),
            price: req.price,
            stock: clamp_count(req.stock),
            image: req.image,
        }
    }
}

/// 商品字段补丁；外层 None 表示不修改
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub sold: Option<u32>,
    pub image: Option<Option<String>>,
}

impl ProductPatch {
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(sold) = self.sold {
            product.sold = sold;
        }
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
        product.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn record_with_title_only_uses_title() {
        let record: ProductRecord = serde_json::from_value(json!({
            "title": "Legacy Mug",
            "price": 10,
            "stock": 3
        }))
        .unwrap();

        let product = record.normalize(now());
        assert_eq!(product.name, "Legacy Mug");
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.sold, 0);
        assert_eq!(product.created_at, now());
    }

    #[test]
    fn record_without_any_name_is_unknown() {
        let product = ProductRecord::default().normalize(now());
        assert_eq!(product.name, UNKNOWN_NAME);
        assert_eq!(product.price, 0.0);
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn record_keeps_valid_uuid_and_timestamps() {
        let id = Uuid::new_v4();
        let record: ProductRecord = serde_json::from_value(json!({
            "_id": id.to_string(),
            "name": "Lamp",
            "category": "  ",
            "price": "19.5",
            "stock": "4",
            "sold": 2,
            "createdAt": "2024-01-02T00:00:00Z"
        }))
        .unwrap();

        let product = record.normalize(now());
        assert_eq!(product.id, id);
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.price, 19.5);
        assert_eq!(product.stock, 4);
        assert_eq!(product.sold, 2);
        assert_eq!(product.created_at, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(product.updated_at, product.created_at);
    }

    #[test]
    fn create_request_rejects_blank_name_and_negative_price() {
        let req = CreateProductRequest {
            name: "   ".to_string(),
            description: None,
            category: None,
            price: -1.0,
            stock: 1,
            image: None,
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn create_request_treats_empty_image_as_missing() {
        let req = CreateProductRequest {
            name: " Chair ".to_string(),
            description: Some(String::new()),
            category: Some(String::new()),
            price: 5.0,
            stock: 2,
            image: Some(String::new()),
        }
        .normalized();

        assert!(req.validate().is_ok());
        let new_product = NewProduct::from(req);
        assert_eq!(new_product.name, "Chair");
        assert_eq!(new_product.category, DEFAULT_CATEGORY);
        assert_eq!(new_product.image, None);
        assert_eq!(new_product.description, None);
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut product = ProductRecord::default().normalize(now());
        product.name = "Desk".to_string();
        product.stock = 7;

        let patch = UpdateProductRequest {
            stock: Some(6),
            sold: Some(1),
            description: Some(String::new()),
            ..Default::default()
        }
        .into_patch();
        let later = now() + chrono::Duration::minutes(5);
        patch.apply_to(&mut product, later);

        assert_eq!(product.name, "Desk");
        assert_eq!(product.stock, 6);
        assert_eq!(product.sold, 1);
        assert_eq!(product.description, None);
        assert_eq!(product.updated_at, later);
    }
}
