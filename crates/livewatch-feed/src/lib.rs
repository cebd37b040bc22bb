//! Live-commerce metrics feed.
//!
//! A [`MetricSource`] produces one [`FeedFrame`] per fetch. The
//! [`feed::MetricsFeed`] keeps the latest snapshot set, a bounded history per
//! tracked series and the recent order ticker, and drives periodic refreshes
//! from a single owned timer task.

pub mod drilldown;
pub mod error;
pub mod feed;
pub mod http;
pub mod series;
pub mod simulated;


use async_trait::async_trait;
use livewatch_common::dashboard::DashboardData;
use livewatch_common::types::{FetchFilters, MetricSnapshot, OrderRecord, TimeSeriesPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use error::FeedError;
pub use feed::{FeedEvent, FeedOptions, MetricsFeed};

/// One fetch worth of data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedFrame {
    pub metrics: Vec<MetricSnapshot>,
    /// New orders, newest first
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    /// Trend, ranking, profile and picker panels
    #[serde(flatten)]
    pub dashboard: DashboardData,
    /// Recent history per metric key, oldest first. A refresh seeds tracked
    /// series from it.
    #[serde(default)]
    pub history: HashMap<String, Vec<TimeSeriesPoint>>,
}

/// A source of metric frames (simulated generator, remote API, ...).
///
/// Called once per refresh or timer tick; implementations must not retry
/// internally.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Source name used in logs (e.g. `"simulated"`, `"http"`).
    fn name(&self) -> &str;

    /// Fetches one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source is unreachable or returns a
    /// malformed or failed response.
    async fn fetch(&self, filters: Option<&FetchFilters>) -> error::Result<FeedFrame>;
}
