//! Dashboard panels that accompany the metric snapshot (sales trend, product
//! ranking, audience profile, anchor and category pickers) and the drill-down
//! views built from a single metric, product or order.

use crate::types::{MetricSnapshot, OrderRecord, TimeSeriesPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Hourly sales, order and conversion-rate curves for the current day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesTrend {
    #[serde(default)]
    pub sales: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub orders: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub conversion_rate: Vec<TimeSeriesPoint>,
}

/// One row of the product sales ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSales {
    pub name: String,
    /// Units sold
    pub sales: u32,
    pub revenue: f64,
    pub price: f64,
}

/// Share of the audience in one bucket of a profile dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProfileSlice {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProfileDimension {
    #[default]
    Age,
    Gender,
    Region,
}

impl FromStr for ProfileDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "age" => Ok(Self::Age),
            "gender" => Ok(Self::Gender),
            "region" => Ok(Self::Region),
            _ => Err(format!("unknown profile dimension: {s}")),
        }
    }
}

impl std::fmt::Display for ProfileDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Age => write!(f, "age"),
            Self::Gender => write!(f, "gender"),
            Self::Region => write!(f, "region"),
        }
    }
}

/// Audience breakdown by age, gender and region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    #[serde(default)]
    pub age: Vec<ProfileSlice>,
    #[serde(default)]
    pub gender: Vec<ProfileSlice>,
    #[serde(default)]
    pub region: Vec<ProfileSlice>,
}

impl UserProfile {
    pub fn slices(&self, dimension: ProfileDimension) -> &[ProfileSlice] {
        match dimension {
            ProfileDimension::Age => &self.age,
            ProfileDimension::Gender => &self.gender,
            ProfileDimension::Region => &self.region,
        }
    }
}

/// A streamer; `id` is what the `anchor_id` filter refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Anchor {
    pub id: String,
    pub name: String,
    pub followers: u64,
    pub is_live: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A product category; `id` is what the `category_id` filter refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub product_count: u32,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Everything a full fetch carries besides metrics and orders. Replaced as a
/// whole on refresh; realtime ticks leave it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DashboardData {
    pub sales_trend: SalesTrend,
    /// Sorted by units sold, highest first
    pub products: Vec<ProductSales>,
    pub user_profile: UserProfile,
    pub anchors: Vec<Anchor>,
    pub categories: Vec<Category>,
}

impl DashboardData {
    pub fn product(&self, name: &str) -> Option<&ProductSales> {
        self.products.iter().find(|p| p.name == name)
    }
}

// ---- Drill-down ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PeakTime {
    /// Time window label, e.g. `20:00-22:00`
    pub time: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PeriodComparison {
    pub yesterday: f64,
    pub last_week: f64,
    pub last_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricDetails {
    pub metric: MetricSnapshot,
    /// 24 points, `00:00` to `23:00`
    pub hourly_trend: Vec<TimeSeriesPoint>,
    pub top_products: Vec<NamedValue>,
    pub peak_time: PeakTime,
    pub comparison: PeriodComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySales {
    pub day: String,
    pub sales: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewSummary {
    /// 3.0 to 5.0, one decimal
    pub rating: f64,
    pub count: u32,
    /// Percent of positive reviews
    pub positive_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Inventory {
    pub current: u32,
    pub total: u32,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Competitor {
    pub name: String,
    pub price: f64,
    pub sales: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductDetails {
    pub product: ProductSales,
    /// Last seven days, oldest first
    pub sales_trend: Vec<DailySales>,
    pub reviews: ReviewSummary,
    pub inventory: Inventory,
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerInfo {
    pub name: String,
    /// Masked phone number
    pub phone: String,
    pub address: String,
    pub level: String,
    pub total_orders: u32,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentInfo {
    pub method: String,
    pub status: String,
    pub amount: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingInfo {
    pub company: String,
    pub tracking_number: String,
    pub status: String,
    /// `YYYY-MM-DD`
    pub estimated_delivery: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PastOrder {
    pub product: String,
    pub amount: f64,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetails {
    pub order: OrderRecord,
    pub customer: CustomerInfo,
    pub payment: PaymentInfo,
    pub shipping: ShippingInfo,
    /// The buyer's earlier orders
    pub history: Vec<PastOrder>,
}
