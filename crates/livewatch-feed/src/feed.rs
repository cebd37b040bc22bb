use crate::drilldown;
use crate::error::Result;
use crate::series::{BoundedSeries, DEFAULT_SERIES_CAPACITY};
use crate::{FeedFrame, MetricSource};
use livewatch_common::dashboard::{
    Anchor, Category, DashboardData, MetricDetails, OrderDetails, ProductDetails, ProductSales,
    SalesTrend, UserProfile,
};
use livewatch_common::types::{
    find_metric, metric_keys, FetchFilters, MetricSnapshot, OrderRecord, TimeSeriesPoint,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_MAX_ORDERS: usize = 20;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub update_interval: Duration,
    pub series_capacity: usize,
    /// Metric keys that get a rolling history
    pub tracked_series: Vec<String>,
    pub max_orders: usize,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            series_capacity: DEFAULT_SERIES_CAPACITY,
            tracked_series: vec![metric_keys::ONLINE_USERS.to_string()],
            max_orders: DEFAULT_MAX_ORDERS,
        }
    }
}

/// Published after every applied refresh or tick, and on fetch failure.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Snapshot(Arc<Vec<MetricSnapshot>>),
    FetchFailed(String),
}

#[derive(Default)]
struct FeedState {
    snapshot: Vec<MetricSnapshot>,
    dashboard: DashboardData,
    series: HashMap<String, BoundedSeries>,
    orders: VecDeque<OrderRecord>,
    new_order_count: u64,
    in_flight: usize,
    applied_seq: u64,
}

struct Shared {
    source: Arc<dyn MetricSource>,
    state: Mutex<FeedState>,
    timer: Mutex<Option<JoinHandle<()>>>,
    interval_ms: AtomicU64,
    /// Bumped on every start/stop; ticks from an older generation are dropped.
    generation: AtomicU64,
    fetch_seq: AtomicU64,
    events: broadcast::Sender<FeedEvent>,
    max_orders: usize,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, FeedState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_seq(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, event: FeedEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn fetch_failed(&self, error: &crate::FeedError) {
        tracing::warn!(source = self.source.name(), error = %error, "Metric fetch failed, keeping last snapshot");
        self.publish(FeedEvent::FetchFailed(error.to_string()));
    }
}

/// Holds the active snapshot set, per-series history and order ticker, and
/// owns at most one periodic update task.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MetricsFeed {
    shared: Arc<Shared>,
}

impl MetricsFeed {
    pub fn new(source: Arc<dyn MetricSource>, options: FeedOptions) -> Self {
        let capacity = options.series_capacity;
        let series = options
            .tracked_series
            .iter()
            .map(|key| (key.clone(), BoundedSeries::new(capacity)))
            .collect();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let interval = options.update_interval.max(MIN_UPDATE_INTERVAL);

        Self {
            shared: Arc::new(Shared {
                source,
                state: Mutex::new(FeedState {
                    series,
                    ..Default::default()
                }),
                timer: Mutex::new(None),
                interval_ms: AtomicU64::new(duration_ms(interval)),
                generation: AtomicU64::new(0),
                fetch_seq: AtomicU64::new(0),
                events,
                max_orders: options.max_orders.max(1),
            }),
        }
    }

    pub fn source_name(&self) -> &str {
        self.shared.source.name()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.shared.events.subscribe()
    }

    /// One fetch from the source. Leaves the active snapshot and history
    /// untouched.
    pub async fn fetch_snapshot(&self, filters: Option<&FetchFilters>) -> Result<Vec<MetricSnapshot>> {
        self.shared.source.fetch(filters).await.map(|frame| frame.metrics)
    }

    /// Fetch and replace the active snapshot, dashboard panels and order list.
    /// History is never appended; a tracked series is reseeded only when the
    /// frame carries history for it. On failure everything stays in place.
    pub async fn refresh(&self, filters: Option<&FetchFilters>) -> Result<()> {
        let shared = &self.shared;
        let seq = shared.next_seq();

        let result = {
            let _loading = LoadingGuard::enter(shared);
            shared.source.fetch(filters).await
        };

        let frame = match result {
            Ok(frame) => frame,
            Err(e) => {
                shared.fetch_failed(&e);
                return Err(e);
            }
        };

        let metrics = {
            let mut state = shared.lock_state();
            if seq <= state.applied_seq {
                tracing::debug!(seq, applied = state.applied_seq, "Discarding stale refresh result");
                return Ok(());
            }
            state.applied_seq = seq;
            state.orders = frame.orders.into_iter().take(shared.max_orders).collect();
            state.snapshot = frame.metrics;
            state.dashboard = frame.dashboard;
            for (key, points) in frame.history {
                if let Some(series) = state.series.get_mut(&key) {
                    series.reseed(points);
                }
            }
            Arc::new(state.snapshot.clone())
        };

        tracing::debug!(count = metrics.len(), "Snapshot refreshed");
        shared.publish(FeedEvent::Snapshot(metrics));
        Ok(())
    }

    /// Start the periodic update at the current interval. A running timer is
    /// stopped first, so at most one is ever active.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_periodic_update(&self) {
        let shared = &self.shared;
        let mut timer = shared.lock_timer();
        if let Some(previous) = timer.take() {
            previous.abort();
        }

        let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let period = self.update_interval();
        let weak = Arc::downgrade(shared);
        *timer = Some(tokio::spawn(run_timer(weak, generation, period)));

        tracing::info!(
            source = shared.source.name(),
            interval_ms = duration_ms(period),
            generation,
            "Periodic update started"
        );
    }

    /// Clamp, store and start at `interval`.
    pub fn start_periodic_update_every(&self, interval: Duration) {
        self.store_interval(interval);
        self.start_periodic_update();
    }

    /// Cancel the timer. Returns whether one was running.
    pub fn stop_periodic_update(&self) -> bool {
        let shared = &self.shared;
        let mut timer = shared.lock_timer();
        shared.generation.fetch_add(1, Ordering::SeqCst);
        match timer.take() {
            Some(handle) => {
                handle.abort();
                tracing::info!("Periodic update stopped");
                true
            }
            None => false,
        }
    }

    /// Set the update interval (minimum one second). A running timer is
    /// restarted at the new interval; history is kept. Returns the effective
    /// interval.
    pub fn set_update_interval(&self, interval: Duration) -> Duration {
        let effective = self.store_interval(interval);
        if self.is_running() {
            self.start_periodic_update();
        }
        effective
    }

    fn store_interval(&self, interval: Duration) -> Duration {
        let effective = interval.max(MIN_UPDATE_INTERVAL);
        self.shared
            .interval_ms
            .store(duration_ms(effective), Ordering::SeqCst);
        effective
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.shared.interval_ms.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.shared
            .lock_timer()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock_state().in_flight > 0
    }

    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        self.shared.lock_state().snapshot.clone()
    }

    /// History of a tracked series, oldest first. `None` if `key` is not
    /// tracked.
    pub fn series(&self, key: &str) -> Option<Vec<TimeSeriesPoint>> {
        self.shared.lock_state().series.get(key).map(BoundedSeries::to_vec)
    }

    pub fn series_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.shared.lock_state().series.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Newest first.
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.shared.lock_state().orders.iter().cloned().collect()
    }

    pub fn new_order_count(&self) -> u64 {
        self.shared.lock_state().new_order_count
    }

    pub fn reset_new_order_count(&self) {
        self.shared.lock_state().new_order_count = 0;
    }

    pub fn dashboard(&self) -> DashboardData {
        self.shared.lock_state().dashboard.clone()
    }

    pub fn sales_trend(&self) -> SalesTrend {
        self.shared.lock_state().dashboard.sales_trend.clone()
    }

    /// Product ranking, best seller first.
    pub fn products(&self) -> Vec<ProductSales> {
        self.shared.lock_state().dashboard.products.clone()
    }

    pub fn user_profile(&self) -> UserProfile {
        self.shared.lock_state().dashboard.user_profile.clone()
    }

    pub fn anchors(&self) -> Vec<Anchor> {
        self.shared.lock_state().dashboard.anchors.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.shared.lock_state().dashboard.categories.clone()
    }

    /// Drill-down for a metric in the active snapshot.
    pub fn metric_details(&self, key: &str) -> Option<MetricDetails> {
        let metric = find_metric(&self.shared.lock_state().snapshot, key)?.clone();
        Some(drilldown::metric_details(metric))
    }

    /// Drill-down for a product in the current ranking.
    pub fn product_details(&self, name: &str) -> Option<ProductDetails> {
        let product = self.shared.lock_state().dashboard.product(name)?.clone();
        Some(drilldown::product_details(product))
    }

    /// Drill-down for an order still in the ticker.
    pub fn order_details(&self, id: &str) -> Option<OrderDetails> {
        let order = self
            .shared
            .lock_state()
            .orders
            .iter()
            .find(|o| o.id == id)?
            .clone();
        Some(drilldown::order_details(order))
    }
}

/// Counts an in-flight refresh for `is_loading`, released on drop so a
/// cancelled refresh does not leave the flag set.
struct LoadingGuard<'a>(&'a Shared);

impl<'a> LoadingGuard<'a> {
    fn enter(shared: &'a Shared) -> Self {
        shared.lock_state().in_flight += 1;
        Self(shared)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock_state();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

async fn run_timer(shared: Weak<Shared>, generation: u64, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            tracing::debug!(generation, "Feed dropped, timer exiting");
            return;
        };
        tick(&shared, generation).await;
    }
}

async fn tick(shared: &Shared, generation: u64) {
    let seq = shared.next_seq();
    let frame = match shared.source.fetch(None).await {
        Ok(frame) => frame,
        Err(e) => {
            if shared.generation.load(Ordering::SeqCst) == generation {
                shared.fetch_failed(&e);
            }
            return;
        }
    };

    let metrics = {
        let mut state = shared.lock_state();
        if shared.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, seq, "Discarding tick from a stopped timer");
            return;
        }
        apply_tick(&mut state, seq, frame, shared.max_orders)
    };

    tracing::debug!(generation, seq, "Realtime tick applied");
    shared.publish(FeedEvent::Snapshot(metrics));
}

/// Appends the tick's series points and orders unconditionally. The active
/// snapshot is only replaced when no newer fetch has landed in the meantime.
fn apply_tick(
    state: &mut FeedState,
    seq: u64,
    frame: FeedFrame,
    max_orders: usize,
) -> Arc<Vec<MetricSnapshot>> {
    let label = chrono::Local::now().format("%H:%M:%S").to_string();

    for (key, series) in state.series.iter_mut() {
        match find_metric(&frame.metrics, key).and_then(|m| m.value.as_number()) {
            Some(value) => {
                series.push(TimeSeriesPoint {
                    time: label.clone(),
                    value,
                });
            }
            None => tracing::debug!(key = %key, "Tracked metric missing or non-numeric, no point appended"),
        }
    }

    let received = frame.orders.len();
    for order in frame.orders.into_iter().rev() {
        state.orders.push_front(order);
    }
    state.orders.truncate(max_orders);
    state.new_order_count += received as u64;

    let metrics = Arc::new(frame.metrics);
    if seq > state.applied_seq {
        state.applied_seq = seq;
        state.snapshot = metrics.as_ref().clone();
    } else {
        tracing::debug!(seq, applied = state.applied_seq, "Newer snapshot already applied, keeping it");
    }
    metrics
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
