use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Metric keys produced by the live-commerce sources.
pub mod metric_keys {
    pub const ONLINE_USERS: &str = "onlineUsers";
    pub const TOTAL_VIEWS: &str = "totalViews";
    pub const SALES_AMOUNT: &str = "salesAmount";
    pub const ORDER_COUNT: &str = "orderCount";
    pub const AVG_ORDER_VALUE: &str = "avgOrderValue";
    pub const CONVERSION_RATE: &str = "conversionRate";
}

/// A metric value as reported by a source: either numeric or a preformatted
/// string such as `"3.0"`.
///
/// # Examples
///
/// ```
/// use livewatch_common::types::MetricValue;
///
/// assert_eq!(MetricValue::Number(400.0).as_number(), Some(400.0));
/// assert_eq!(MetricValue::Text(" 3.0 ".into()).as_number(), Some(3.0));
/// assert_eq!(MetricValue::Text("n/a".into()).as_number(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value. Text is trimmed and parsed; anything that
    /// does not parse, or parses to NaN, yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// One dashboard metric at a point in time, identified by `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricSnapshot {
    /// Metric key, e.g. `onlineUsers`
    pub key: String,
    /// Display title
    pub title: String,
    /// Current value (number or preformatted string)
    pub value: MetricValue,
    /// Unit label
    #[serde(default)]
    pub unit: Option<String>,
    /// Trend direction
    #[serde(default)]
    pub trend: Option<Trend>,
    /// Trend magnitude (percent)
    #[serde(default)]
    pub trend_value: Option<f64>,
    /// Whether the value is a monetary amount
    #[serde(default)]
    pub is_currency: bool,
}

impl MetricSnapshot {
    pub fn new(key: impl Into<String>, title: impl Into<String>, value: MetricValue) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            value,
            unit: None,
            trend: None,
            trend_value: None,
            is_currency: false,
        }
    }
}

/// Find a snapshot by key.
pub fn find_metric<'a>(metrics: &'a [MetricSnapshot], key: &str) -> Option<&'a MetricSnapshot> {
    metrics.iter().find(|m| m.key == key)
}

/// A single point of a time series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeSeriesPoint {
    /// Time label, e.g. `14:03:27`
    pub time: String,
    pub value: f64,
}

/// Alert level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use livewatch_common::types::AlertLevel;
///
/// let level: AlertLevel = "warning".parse().unwrap();
/// assert_eq!(level, AlertLevel::Warning);
/// assert_eq!(level.to_string(), "warning");
/// assert!(AlertLevel::Error > AlertLevel::Info);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Info => write!(f, "info"),
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(AlertLevel::Info),
            "warning" => Ok(AlertLevel::Warning),
            "error" => Ok(AlertLevel::Error),
            _ => Err(format!("unknown alert level: {s}")),
        }
    }
}

/// Threshold comparator. Comparisons are strict and exact (no epsilon).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    GreaterThan,
    LessThan,
    Equal,
    NotEqual,
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greater_than" | "gt" => Ok(Self::GreaterThan),
            "less_than" | "lt" => Ok(Self::LessThan),
            "equal" | "eq" => Ok(Self::Equal),
            "not_equal" | "ne" => Ok(Self::NotEqual),
            _ => Err(format!("unknown compare operator: {s}")),
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GreaterThan => write!(f, "greater_than"),
            Self::LessThan => write!(f, "less_than"),
            Self::Equal => write!(f, "equal"),
            Self::NotEqual => write!(f, "not_equal"),
        }
    }
}

impl CompareOp {
    #[allow(clippy::float_cmp)]
    pub fn check(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::Equal => value == threshold,
            Self::NotEqual => value != threshold,
        }
    }
}

/// A static threshold rule bound to one metric key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertRule {
    /// Metric key the rule watches
    pub metric: String,
    pub operator: CompareOp,
    pub threshold: f64,
    pub level: AlertLevel,
    /// Human-readable message attached to produced alerts
    pub message: String,
}

/// An alert produced by a rule match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertMessage {
    /// Snowflake id
    pub id: String,
    /// Originating rule
    pub rule: AlertRule,
    /// Value observed when the rule matched
    pub current_value: f64,
    pub message: String,
    pub level: AlertLevel,
    pub timestamp: DateTime<Utc>,
    /// Whether the alert has been marked read
    pub read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Completed,
}

/// A live order shown in the real-time order ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderRecord {
    pub id: String,
    pub product_name: String,
    pub price: f64,
    pub quantity: u32,
    pub buyer: String,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

/// Filters forwarded to a metric source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FetchFilters {
    /// `realtime`, `today`, ...
    #[serde(default)]
    pub time_dimension: Option<String>,
    #[serde(default)]
    pub anchor_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl FetchFilters {
    /// Non-empty filters as query pairs.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("time_dimension", self.time_dimension.as_deref()),
            ("anchor_id", self.anchor_id.as_deref()),
            ("category_id", self.category_id.as_deref()),
            ("start_date", self.start_date.as_deref()),
            ("end_date", self.end_date.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k, v)))
        .collect()
    }
}

/// JSON envelope used by every `/api/...` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// 0 on success
    pub code: i32,
    pub data: Option<T>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_value_untagged_serde() {
        let n: MetricValue = serde_json::from_str("400").unwrap();
        assert_eq!(n, MetricValue::Number(400.0));
        let s: MetricValue = serde_json::from_str("\"3.0\"").unwrap();
        assert_eq!(s, MetricValue::Text("3.0".into()));
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"3.0\"");
    }

    #[test]
    fn metric_value_nan_text_is_not_a_number() {
        assert_eq!(MetricValue::Text("NaN".into()).as_number(), None);
        assert_eq!(MetricValue::Number(f64::NAN).as_number(), None);
        assert_eq!(MetricValue::Text(String::new()).as_number(), None);
    }

    #[test]
    fn compare_op_parses_long_and_short_forms() {
        assert_eq!("less_than".parse::<CompareOp>().unwrap(), CompareOp::LessThan);
        assert_eq!("ne".parse::<CompareOp>().unwrap(), CompareOp::NotEqual);
        assert!("between".parse::<CompareOp>().is_err());
        assert_eq!(CompareOp::GreaterThan.to_string(), "greater_than");
    }

    #[test]
    fn compare_op_is_strict() {
        assert!(!CompareOp::LessThan.check(500.0, 500.0));
        assert!(!CompareOp::GreaterThan.check(500.0, 500.0));
        assert!(CompareOp::Equal.check(2.0, 2.0));
        assert!(!CompareOp::Equal.check(2.0000001, 2.0));
        assert!(CompareOp::NotEqual.check(2.0000001, 2.0));
    }

    #[test]
    fn filters_skip_empty_values() {
        let filters = FetchFilters {
            time_dimension: Some("today".into()),
            anchor_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filters.query_pairs(), vec![("time_dimension", "today")]);
    }
}
