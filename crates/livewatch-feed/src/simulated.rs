use crate::error::Result;
use crate::{FeedFrame, MetricSource};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, Utc};
use livewatch_common::dashboard::{
    Anchor, Category, DashboardData, ProductSales, ProfileSlice, SalesTrend, UserProfile,
};
use livewatch_common::i18n::tr;
use livewatch_common::types::{
    metric_keys, FetchFilters, MetricSnapshot, MetricValue, OrderRecord, OrderStatus,
    TimeSeriesPoint, Trend,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

const PRODUCTS: &[&str] = &[
    "iPhone 15 Pro Max 256GB",
    "华为Mate 60 Pro 512GB",
    "小米14 Ultra 1TB",
    "iPad Air 5 256GB WiFi版",
    "华为Watch GT 4",
    "AirPods Pro 2代",
    "华为FreeBuds Pro 3",
    "小米手环8 Pro",
    "MacBook Air M2 8GB+256GB",
];

const BUYERS: &[&str] = &[
    "张小明", "李小红", "王小华", "赵小丽", "陈小军", "刘小美", "孙小强", "周小燕",
];

const RANKED_PRODUCTS: &[&str] = &[
    "iPhone 15 Pro",
    "华为Mate 60",
    "小米14",
    "iPad Air",
    "华为手表",
    "AirPods Pro",
    "华为耳机",
    "小米手环",
    "MacBook Air",
    "华为平板",
];

const ANCHORS: &[(&str, u64)] = &[
    ("李佳琦", 5_000_000),
    ("薇娅", 4_000_000),
    ("罗永浩", 3_000_000),
    ("辛巴", 3_500_000),
    ("李子柒", 2_800_000),
];

const CATEGORIES: &[&str] = &[
    "手机数码",
    "电脑办公",
    "家用电器",
    "美妆护肤",
    "服装鞋包",
    "食品生鲜",
    "家居日用",
    "运动户外",
    "汽车用品",
    "图书音像",
];

const AGE_PROFILE: &[(&str, f64)] = &[("18-25岁", 35.0), ("26-35岁", 40.0), ("36-45岁", 20.0), ("46岁以上", 5.0)];
const GENDER_PROFILE: &[(&str, f64)] = &[("男性", 55.0), ("女性", 45.0)];
const REGION_PROFILE: &[(&str, f64)] = &[
    ("广东", 25.0),
    ("江苏", 18.0),
    ("浙江", 15.0),
    ("山东", 12.0),
    ("河南", 10.0),
    ("其他", 20.0),
];

/// Points of online-user history sent with every frame, one per minute.
const HISTORY_POINTS: i64 = 60;

const STATUSES: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Paid,
    OrderStatus::Shipped,
    OrderStatus::Completed,
];

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Orders generated per fetch.
const ORDERS_PER_FETCH: usize = 3;

/// Random-valued live-commerce source for development.
///
/// Online users follow a random walk between fetches; the other metrics and
/// the dashboard panels are drawn fresh each time. Filters are accepted and
/// ignored.
pub struct SimulatedSource {
    latency: Duration,
    locale: String,
    online_users: Mutex<Option<f64>>,
}

impl SimulatedSource {
    pub fn new(latency: Duration, locale: impl Into<String>) -> Self {
        Self {
            latency,
            locale: locale.into(),
            online_users: Mutex::new(None),
        }
    }

    fn next_online_users(&self, rng: &mut impl Rng) -> f64 {
        let mut last = self
            .online_users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = match *last {
            Some(prev) => (prev + rng.gen_range(-25.0..25.0)).max(0.0).floor(),
            None => f64::from(rng.gen_range(800..2800_u32)),
        };
        *last = Some(next);
        next
    }

    fn generate(&self) -> FeedFrame {
        let mut rng = rand::thread_rng();
        let online_users = self.next_online_users(&mut rng);
        let history = HashMap::from([(
            metric_keys::ONLINE_USERS.to_string(),
            generate_online_history(&mut rng),
        )]);
        FeedFrame {
            metrics: self.generate_metrics(&mut rng, online_users),
            orders: generate_orders(&mut rng, ORDERS_PER_FETCH),
            dashboard: generate_dashboard(&mut rng),
            history,
        }
    }

    fn generate_metrics(&self, rng: &mut impl Rng, online_users: f64) -> Vec<MetricSnapshot> {
        let metric = |key: &str, value: MetricValue, unit: &str, trend: Trend, trend_value: u32| {
            let mut m = MetricSnapshot::new(key, tr(&self.locale, &format!("metric.{key}")), value);
            m.unit = Some(unit.to_string());
            m.trend = Some(trend);
            m.trend_value = Some(f64::from(trend_value));
            m
        };

        let conversion_rate = format!("{:.1}", rng.gen_range(2.0..7.0));

        let mut sales = metric(
            metric_keys::SALES_AMOUNT,
            MetricValue::Number(f64::from(rng.gen_range(200_000..700_000_u32))),
            "元",
            Trend::Up,
            rng.gen_range(15..40),
        );
        sales.is_currency = true;

        let mut avg_order_value = metric(
            metric_keys::AVG_ORDER_VALUE,
            MetricValue::Number(f64::from(rng.gen_range(200..700_u32))),
            "元",
            random_trend(rng),
            rng.gen_range(2..12),
        );
        avg_order_value.is_currency = true;

        vec![
            metric(
                metric_keys::ONLINE_USERS,
                MetricValue::Number(online_users),
                "人",
                random_trend(rng),
                rng.gen_range(5..25),
            ),
            metric(
                metric_keys::TOTAL_VIEWS,
                MetricValue::Number(f64::from(rng.gen_range(20_000..70_000_u32))),
                "次",
                Trend::Up,
                rng.gen_range(10..40),
            ),
            sales,
            metric(
                metric_keys::ORDER_COUNT,
                MetricValue::Number(f64::from(rng.gen_range(800..2800_u32))),
                "单",
                Trend::Up,
                rng.gen_range(8..28),
            ),
            avg_order_value,
            metric(
                metric_keys::CONVERSION_RATE,
                MetricValue::Text(conversion_rate),
                "%",
                random_trend(rng),
                rng.gen_range(1..6),
            ),
        ]
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY, livewatch_common::i18n::DEFAULT_LOCALE)
    }
}

fn random_trend(rng: &mut impl Rng) -> Trend {
    if rng.gen_bool(0.5) {
        Trend::Up
    } else {
        Trend::Down
    }
}

fn generate_dashboard(rng: &mut impl Rng) -> DashboardData {
    DashboardData {
        sales_trend: generate_sales_trend(rng),
        products: generate_product_ranking(rng),
        user_profile: UserProfile {
            age: profile_slices(AGE_PROFILE),
            gender: profile_slices(GENDER_PROFILE),
            region: profile_slices(REGION_PROFILE),
        },
        anchors: ANCHORS
            .iter()
            .enumerate()
            .map(|(i, (name, followers))| Anchor {
                id: format!("anchor_{}", i + 1),
                name: (*name).to_string(),
                followers: *followers,
                is_live: rng.gen_bool(0.7),
                avatar: Some(format!("https://api.dicebear.com/7.x/avataaars/svg?seed={name}")),
            })
            .collect(),
        categories: CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, name)| Category {
                id: format!("category_{}", i + 1),
                name: (*name).to_string(),
                product_count: rng.gen_range(100..1100),
                icon: Some("icon-tag".to_string()),
            })
            .collect(),
    }
}

/// One point per hour of the day.
fn generate_sales_trend(rng: &mut impl Rng) -> SalesTrend {
    let mut trend = SalesTrend::default();
    for hour in 0..24 {
        let time = format!("{hour:02}:00");
        trend.sales.push(TimeSeriesPoint {
            time: time.clone(),
            value: f64::from(rng.gen_range(20_000..70_000_u32)),
        });
        trend.orders.push(TimeSeriesPoint {
            time: time.clone(),
            value: f64::from(rng.gen_range(80..280_u32)),
        });
        trend.conversion_rate.push(TimeSeriesPoint {
            time,
            value: (rng.gen_range(2.0..5.0_f64) * 10.0).round() / 10.0,
        });
    }
    trend
}

/// Best seller first.
fn generate_product_ranking(rng: &mut impl Rng) -> Vec<ProductSales> {
    let mut products: Vec<ProductSales> = RANKED_PRODUCTS
        .iter()
        .map(|name| ProductSales {
            name: (*name).to_string(),
            sales: rng.gen_range(100..600),
            revenue: f64::from(rng.gen_range(50_000..150_000_u32)),
            price: f64::from(rng.gen_range(2000..10_000_u32)),
        })
        .collect();
    products.sort_by(|a, b| b.sales.cmp(&a.sales));
    products
}

fn profile_slices(table: &[(&str, f64)]) -> Vec<ProfileSlice> {
    table
        .iter()
        .map(|(name, share)| ProfileSlice {
            name: (*name).to_string(),
            value: *share,
            percentage: *share,
        })
        .collect()
}

/// The last hour of online users, one point per minute, oldest first.
fn generate_online_history(rng: &mut impl Rng) -> Vec<TimeSeriesPoint> {
    let now = Local::now();
    (0..HISTORY_POINTS)
        .rev()
        .map(|minutes_ago| {
            let wave = (minutes_ago as f64 * 0.1).sin() * 200.0;
            let value = f64::from(rng.gen_range(500..1500_u32)) + wave;
            TimeSeriesPoint {
                time: (now - ChronoDuration::minutes(minutes_ago))
                    .format("%H:%M:%S")
                    .to_string(),
                value: value.max(0.0).floor(),
            }
        })
        .collect()
}

/// Newest first.
fn generate_orders(rng: &mut impl Rng, count: usize) -> Vec<OrderRecord> {
    let now = Utc::now();
    let mut orders: Vec<OrderRecord> = (0..count)
        .map(|_| OrderRecord {
            id: livewatch_common::id::next_prefixed("ORDER"),
            product_name: PRODUCTS.choose(rng).copied().unwrap_or_default().to_string(),
            price: f64::from(rng.gen_range(1000..9000_u32)),
            quantity: rng.gen_range(1..=3),
            buyer: BUYERS.choose(rng).copied().unwrap_or_default().to_string(),
            status: STATUSES.choose(rng).copied().unwrap_or(OrderStatus::Pending),
            timestamp: now - ChronoDuration::seconds(rng.gen_range(0..60)),
        })
        .collect();
    orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    orders
}

#[async_trait]
impl MetricSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn fetch(&self, filters: Option<&FetchFilters>) -> Result<FeedFrame> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(filters) = filters {
            tracing::debug!(?filters, "Simulated source ignores filters");
        }
        Ok(self.generate())
    }
}
