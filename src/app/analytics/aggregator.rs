//! 仪表盘聚合
//!
//! 商品和销售是两条独立的数据流，这里只做按时间窗口分桶和求和，
//! 从不按 id 关联。所有函数都是纯函数，遇到坏数据只会得到空或零，
//! 不会返回错误。

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use std::collections::HashMap;

use super::model::{
    CategorySlice, ChartRange, Dashboard, Kpis, LowStockItem, RevenuePoint, StockPoint,
};
use crate::app::products::model::Product;
use crate::app::sales::model::Sale;

/// 库存低于此值（且大于 0）视为低库存
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// 没有任何商品时饼图的占位分类
pub const NO_DATA_CATEGORY: &str = "No Data";

/// "Jan 5" 形式的日期标签
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// 给定偏移下 `now` 所在的日历日
pub fn local_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// 以 `today` 结尾（含）的连续 N 天收入
///
/// 分桶键是日期标签而不是日期本身，不同年份同月同日的销售会落进同一个桶。
/// 不在模板中的标签直接丢弃。
pub fn revenue_series(
    sales: &[Sale],
    range: ChartRange,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<RevenuePoint> {
    let days = u64::from(range.days());
    let mut template: Vec<RevenuePoint> = (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|day| RevenuePoint {
            date: day_label(day),
            sales: 0.0,
        })
        .collect();

    let mut buckets: HashMap<String, f64> = HashMap::new();
    for sale in sales {
        let Some(date) = sale.date else { continue };
        let label = day_label(date.with_timezone(&offset).date_naive());
        *buckets.entry(label).or_insert(0.0) += sale.price;
    }

    for point in &mut template {
        if let Some(sum) = buckets.get(&point.date) {
            point.sales = *sum;
        }
    }

    template
}

/// 每个商品的库存与已售，保持输入顺序
pub fn stock_vs_sold(products: &[Product]) -> Vec<StockPoint> {
    products
        .iter()
        .map(|p| StockPoint {
            name: p.name.clone(),
            in_stock: p.stock,
            sold: p.sold,
        })
        .collect()
}

/// 按分类计数，按首次出现的顺序输出；没有商品时输出一个占位分类
pub fn category_distribution(products: &[Product]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for product in products {
        match index.get(product.category.as_str()) {
            Some(&i) => slices[i].value += 1,
            None => {
                index.insert(product.category.as_str(), slices.len());
                slices.push(CategorySlice {
                    name: product.category.clone(),
                    value: 1,
                });
            }
        }
    }

    if slices.is_empty() {
        slices.push(CategorySlice {
            name: NO_DATA_CATEGORY.to_string(),
            value: 1,
        });
    }

    slices
}

pub fn is_low_stock(product: &Product) -> bool {
    product.stock > 0 && product.stock < LOW_STOCK_THRESHOLD
}

pub fn low_stock_items(products: &[Product]) -> Vec<LowStockItem> {
    products
        .iter()
        .filter(|p| is_low_stock(p))
        .map(|p| LowStockItem {
            id: p.id,
            name: p.name.clone(),
            stock: p.stock,
        })
        .collect()
}

pub fn kpis(products: &[Product]) -> Kpis {
    Kpis {
        inventory_value: products.iter().map(|p| p.price * f64::from(p.stock)).sum(),
        product_count: products.len(),
        units_sold: products.iter().map(|p| u64::from(p.sold)).sum(),
        low_stock_count: products.iter().filter(|p| is_low_stock(p)).count(),
        sales_value: products.iter().map(|p| p.price * f64::from(p.sold)).sum(),
    }
}

/// 组装完整的仪表盘
pub fn build_dashboard(
    products: &[Product],
    sales: &[Sale],
    range: ChartRange,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Dashboard {
    Dashboard {
        range,
        generated_at: now,
        kpis: kpis(products),
        revenue: revenue_series(sales, range, local_today(now, offset), offset),
        stock_vs_sold: stock_vs_sold(products),
        categories: category_distribution(products),
        low_stock: low_stock_items(products),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn product(price: f64, stock: u32, sold: u32, category: &str) -> Product {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: Uuid::new_v4(),
            name: format!("item-{}-{}", stock, category),
            description: None,
            category: category.to_string(),
            price,
            stock,
            sold,
            image: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn sale(price: f64, date: Option<DateTime<Utc>>) -> Sale {
        Sale {
            id: Uuid::new_v4(),
            product_name: "x".to_string(),
            price,
            date,
        }
    }

    #[test]
    fn labels_use_short_month_and_unpadded_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(day_label(date), "Jan 5");
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(day_label(date), "Dec 25");
    }

    #[test]
    fn worked_example() {
        // Other 分类在归一化时已由空串替换
        let products = vec![product(10.0, 3, 2, "A"), product(5.0, 0, 10, "Other")];

        let k = kpis(&products);
        assert_eq!(k.inventory_value, 30.0);
        assert_eq!(k.units_sold, 12);
        assert_eq!(k.low_stock_count, 1);
        assert_eq!(k.product_count, 2);
        assert_eq!(k.sales_value, 70.0);

        assert_eq!(
            category_distribution(&products),
            vec![
                CategorySlice { name: "A".to_string(), value: 1 },
                CategorySlice { name: "Other".to_string(), value: 1 },
            ]
        );

        let low = low_stock_items(&products);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].stock, 3);
    }

    #[test]
    fn low_stock_boundaries() {
        assert!(!is_low_stock(&product(1.0, 0, 0, "A")));
        assert!(is_low_stock(&product(1.0, 1, 0, "A")));
        assert!(is_low_stock(&product(1.0, 4, 0, "A")));
        assert!(!is_low_stock(&product(1.0, 5, 0, "A")));
    }

    #[test]
    fn empty_products_give_placeholder_and_zero_kpis() {
        assert_eq!(
            category_distribution(&[]),
            vec![CategorySlice { name: NO_DATA_CATEGORY.to_string(), value: 1 }]
        );
        let k = kpis(&[]);
        assert_eq!(k.inventory_value, 0.0);
        assert_eq!(k.product_count, 0);
        assert_eq!(k.units_sold, 0);
        assert_eq!(k.low_stock_count, 0);
        assert!(stock_vs_sold(&[]).is_empty());
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let products = vec![
            product(1.0, 1, 0, "Toys"),
            product(1.0, 1, 0, "Books"),
            product(1.0, 1, 0, "Toys"),
        ];
        let names: Vec<(String, usize)> = category_distribution(&products)
            .into_iter()
            .map(|s| (s.name, s.value))
            .collect();
        assert_eq!(names, vec![("Toys".to_string(), 2), ("Books".to_string(), 1)]);
    }

    #[test]
    fn series_sums_sales_per_day_and_drops_outside_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let sales = vec![
            sale(10.0, Some(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap())),
            sale(5.5, Some(Utc.with_ymd_and_hms(2024, 3, 10, 22, 0, 0).unwrap())),
            sale(2.0, Some(Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap())),
            // 窗口外
            sale(100.0, Some(Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap())),
            // 日期无法解析
            sale(50.0, None),
        ];

        let series = revenue_series(&sales, ChartRange::SevenDays, today, utc());
        assert_eq!(series.len(), 7);
        assert_eq!(series.first().unwrap().date, "Mar 4");
        assert_eq!(series.first().unwrap().sales, 2.0);
        assert_eq!(series.last().unwrap().date, "Mar 10");
        assert_eq!(series.last().unwrap().sales, 15.5);
        let total: f64 = series.iter().map(|p| p.sales).sum();
        assert_eq!(total, 17.5);
    }

    #[test]
    fn series_buckets_in_display_offset() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        // UTC 3 月 9 日 23:30，在 +02:00 下已是 3 月 10 日
        let sales = vec![sale(4.0, Some(Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap()))];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let series = revenue_series(&sales, ChartRange::SevenDays, today, plus_two);
        assert_eq!(series.last().unwrap().sales, 4.0);

        let series = revenue_series(&sales, ChartRange::SevenDays, today, utc());
        assert_eq!(series[5].date, "Mar 9");
        assert_eq!(series[5].sales, 4.0);
    }

    #[test]
    fn same_label_from_another_year_collides() {
        // 按标签分桶的已知局限：去年同一天的销售会计入今天
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let sales = vec![
            sale(1.0, Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap())),
            sale(7.0, Some(Utc.with_ymd_and_hms(2023, 3, 10, 9, 0, 0).unwrap())),
        ];

        let series = revenue_series(&sales, ChartRange::SevenDays, today, utc());
        assert_eq!(series.last().unwrap().sales, 8.0);
    }

    #[test]
    fn thirty_day_window_crosses_month_and_year() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let series = revenue_series(&[], ChartRange::ThirtyDays, today, utc());

        assert_eq!(series.len(), 30);
        assert_eq!(series[0].date, "Dec 5");
        assert_eq!(series[28].date, "Jan 2");
        assert_eq!(series[29].date, "Jan 3");
        assert!(series.iter().all(|p| p.sales == 0.0));
    }

    #[test]
    fn stock_vs_sold_keeps_input_order() {
        let products = vec![product(1.0, 9, 1, "A"), product(1.0, 0, 4, "B")];
        let points = stock_vs_sold(&products);
        assert_eq!(points[0].in_stock, 9);
        assert_eq!(points[1].sold, 4);
        assert_eq!(points[1].name, products[1].name);
    }

    #[test]
    fn dashboard_uses_local_today() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let dashboard = build_dashboard(&[], &[], ChartRange::SevenDays, now, plus_two);

        assert_eq!(dashboard.revenue.last().unwrap().date, "Mar 11");
        assert_eq!(dashboard.categories[0].name, NO_DATA_CATEGORY);
        assert!(dashboard.low_stock.is_empty());
    }
}
