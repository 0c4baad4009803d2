//! PostgreSQL 存储
//!
//! 列都允许为空，读取时按商品/销售的归一化规则补默认值。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, FromRow};
use tracing::info;
use uuid::Uuid;

use super::{ProductStore, SaleStore, Store, StoreError};
use crate::app::normalize::non_blank;
use crate::app::products::model::{
    category_or_default, clamp_count, display_name, NewProduct, Product, ProductPatch, UNKNOWN_NAME,
};
use crate::app::sales::model::{NewSale, Sale};
use crate::core::clock::SharedClock;

const PRODUCT_COLUMNS: &str =
    "id, name, title, description, category, price, stock, sold, image, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    stock: Option<i64>,
    sold: Option<i64>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: display_name(row.name, row.title),
            description: non_blank(row.description),
            category: category_or_default(row.category),
            price: row.price.filter(|p| p.is_finite() && *p >= 0.0).unwrap_or(0.0),
            stock: clamp_count(row.stock.unwrap_or(0)),
            sold: clamp_count(row.sold.unwrap_or(0)),
            image: non_blank(row.image),
            created_at: row.created_at,
            updated_at: row.updated_at.unwrap_or(row.created_at),
        }
    }
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    product_name: Option<String>,
    price: Option<f64>,
    date: Option<DateTime<Utc>>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            product_name: non_blank(row.product_name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            price: row.price.filter(|p| p.is_finite() && *p >= 0.0).unwrap_or(0.0),
            date: row.date,
        }
    }
}

pub struct PgStore {
    pool: PgPool,
    clock: SharedClock,
}

impl PgStore {
    pub fn new(pool: PgPool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// 建表（实际部署应使用迁移）
    pub async fn create_tables(&self) -> Result<(), StoreError> {
        info!("创建数据表...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id UUID PRIMARY KEY,
                name TEXT,
                title TEXT,
                description TEXT,
                category TEXT,
                price DOUBLE PRECISION,
                stock BIGINT,
                sold BIGINT DEFAULT 0,
                image TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sales (
                id UUID PRIMARY KEY,
                product_name TEXT,
                price DOUBLE PRECISION,
                date TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS sales_date_idx ON sales (date)")
            .execute(&self.pool)
            .await?;

        info!("数据表已就绪");
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY created_at ASC, id ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Product::from)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let now = self.clock.now();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (id, name, description, category, price, stock, sold, image, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $8) RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.price)
        .bind(i64::from(new.stock))
        .bind(&new.image)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut product: Product = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Product::from)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        patch.apply_to(&mut product, self.clock.now());

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = $2, description = $3, category = $4, price = $5, \
             stock = $6, sold = $7, image = $8, updated_at = $9 WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(i64::from(product.stock))
        .bind(i64::from(product.sold))
        .bind(&product.image)
        .bind(product.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn sell_one(&self, id: Uuid) -> Result<Product, StoreError> {
        let sold = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET stock = stock - 1, sold = COALESCE(sold, 0) + 1, updated_at = $2 \
             WHERE id = $1 AND stock > 0 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(self.clock.now())
        .fetch_optional(&self.pool)
        .await?;

        match sold {
            Some(row) => Ok(row.into()),
            // 没有更新到行：要么商品不存在，要么库存已空
            None => Err(StoreError::OutOfStock(self.get_product(id).await?.name)),
        }
    }
}

#[async_trait]
impl SaleStore for PgStore {
    async fn record_sale(&self, new: NewSale) -> Result<Sale, StoreError> {
        let row = sqlx::query_as::<_, SaleRow>(
            "INSERT INTO sales (id, product_name, price, date) VALUES ($1, $2, $3, $4) \
             RETURNING id, product_name, price, date",
        )
        .bind(Uuid::new_v4())
        .bind(&new.product_name)
        .bind(new.price)
        .bind(new.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_sales_since(&self, since: DateTime<Utc>) -> Result<Vec<Sale>, StoreError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, product_name, price, date FROM sales WHERE date >= $1 ORDER BY date ASC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
