//! Detail views for a selected metric, product or order.
//!
//! No source serves these; they are synthesised around the selected item, so
//! the same item drilled into twice may show different figures.

use chrono::{Duration as ChronoDuration, Utc};
use livewatch_common::dashboard::{
    Competitor, CustomerInfo, DailySales, Inventory, MetricDetails, NamedValue, OrderDetails,
    PastOrder, PaymentInfo, PeakTime, PeriodComparison, ProductDetails, ProductSales,
    ReviewSummary, ShippingInfo, StockStatus,
};
use livewatch_common::types::{MetricSnapshot, OrderRecord, TimeSeriesPoint};
use rand::seq::SliceRandom;
use rand::Rng;

const TOP_PRODUCTS: &[&str] = &["iPhone 15", "华为Mate 60", "小米14", "iPad Air", "华为手表"];
const HISTORY_PRODUCTS: &[&str] = &["iPhone 15", "华为Mate 60", "小米14", "iPad Air"];
const COMPETITORS: &[&str] = &["竞品A", "竞品B", "竞品C"];

const PEAK_WINDOW: &str = "20:00-22:00";
const DAYS_OF_SALES: u32 = 7;
const PAST_ORDERS: usize = 5;
const DELIVERY_DAYS: i64 = 3;

pub fn metric_details(metric: MetricSnapshot) -> MetricDetails {
    let mut rng = rand::thread_rng();
    let hourly_trend = (0..24)
        .map(|hour| TimeSeriesPoint {
            time: format!("{hour:02}:00"),
            value: f64::from(rng.gen_range(100..1100_u32)),
        })
        .collect();
    let top_products = TOP_PRODUCTS
        .iter()
        .map(|name| NamedValue {
            name: (*name).to_string(),
            value: f64::from(rng.gen_range(10..110_u32)),
        })
        .collect();

    MetricDetails {
        metric,
        hourly_trend,
        top_products,
        peak_time: PeakTime {
            time: PEAK_WINDOW.to_string(),
            value: f64::from(rng.gen_range(500..1500_u32)),
        },
        comparison: PeriodComparison {
            yesterday: f64::from(rng.gen_range(500..1500_u32)),
            last_week: f64::from(rng.gen_range(400..1400_u32)),
            last_month: f64::from(rng.gen_range(300..1300_u32)),
        },
    }
}

pub fn product_details(product: ProductSales) -> ProductDetails {
    let mut rng = rand::thread_rng();
    let sales_trend = (1..=DAYS_OF_SALES)
        .map(|day| DailySales {
            day: format!("第{day}天"),
            sales: rng.gen_range(10..110),
            revenue: f64::from(rng.gen_range(1000..11_000_u32)),
        })
        .collect();
    let competitors = COMPETITORS
        .iter()
        .map(|name| Competitor {
            name: (*name).to_string(),
            price: f64::from(rng.gen_range(500..1500_u32)),
            sales: rng.gen_range(10..110),
        })
        .collect();
    let rating = (rng.gen_range(3.0..5.0_f64) * 10.0).round() / 10.0;
    let total = rng.gen_range(500..2500);

    ProductDetails {
        product,
        sales_trend,
        reviews: ReviewSummary {
            rating,
            count: rng.gen_range(100..1100),
            positive_rate: rng.gen_range(70..100),
        },
        inventory: Inventory {
            current: rng.gen_range(100..1100).min(total),
            total,
            status: if rng.gen_bool(0.3) {
                StockStatus::Low
            } else {
                StockStatus::Normal
            },
        },
        competitors,
    }
}

pub fn order_details(order: OrderRecord) -> OrderDetails {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let history = (0..PAST_ORDERS)
        .map(|_| PastOrder {
            product: HISTORY_PRODUCTS
                .choose(&mut rng)
                .copied()
                .unwrap_or_default()
                .to_string(),
            amount: f64::from(rng.gen_range(100..10_100_u32)),
            date: (now - ChronoDuration::seconds(rng.gen_range(0..30 * 24 * 3600)))
                .format("%Y-%m-%d")
                .to_string(),
        })
        .collect();

    OrderDetails {
        customer: CustomerInfo {
            name: order.buyer.clone(),
            phone: "138****8888".to_string(),
            address: "北京市朝阳区".to_string(),
            level: if rng.gen_bool(0.5) { "VIP" } else { "普通用户" }.to_string(),
            total_orders: rng.gen_range(1..51),
            total_amount: f64::from(rng.gen_range(1000..11_000_u32)),
        },
        payment: PaymentInfo {
            method: if rng.gen_bool(0.5) { "微信支付" } else { "支付宝" }.to_string(),
            status: "已支付".to_string(),
            amount: order.price * f64::from(order.quantity),
            time: order.timestamp,
        },
        shipping: ShippingInfo {
            company: "顺丰快递".to_string(),
            tracking_number: format!("SF{}", now.timestamp_millis()),
            status: "已发货".to_string(),
            estimated_delivery: (order.timestamp + ChronoDuration::days(DELIVERY_DAYS))
                .format("%Y-%m-%d")
                .to_string(),
        },
        history,
        order,
    }
}
