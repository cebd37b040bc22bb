use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use livewatch_alert::AlertEvaluator;
use livewatch_common::types::AlertLevel;
use livewatch_feed::http::HttpSource;
use livewatch_feed::simulated::SimulatedSource;
use livewatch_feed::{MetricSource, MetricsFeed};
use livewatch_notify::channels::toast::ToastBoard;
use livewatch_notify::channels::webhook::WebhookChannel;
use livewatch_notify::routing::ChannelRoute;
use livewatch_notify::{NotificationChannel, NotificationManager};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub feed: MetricsFeed,
    pub evaluator: Arc<Mutex<AlertEvaluator>>,
    pub notifier: Arc<NotificationManager>,
    pub toasts: Arc<ToastBoard>,
    pub config: Arc<ServerConfig>,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    /// Wires the feed, evaluator and notification channels from `config`.
    pub fn build(config: ServerConfig, source: Arc<dyn MetricSource>) -> anyhow::Result<Self> {
        let feed = MetricsFeed::new(source, config.feed.options());

        let rules = config.alert.build_rules(&config.locale)?;
        tracing::info!(rules = rules.len(), max_alerts = config.alert.max_alerts, "Alert rules loaded");
        let evaluator = AlertEvaluator::with_capacity(rules, config.alert.max_alerts);

        let toasts = Arc::new(ToastBoard::new(config.notify.toast_capacity));
        let mut channels: Vec<Arc<dyn NotificationChannel>> = vec![toasts.clone()];
        let mut routes = vec![ChannelRoute::new(AlertLevel::Info, 0)];

        if let Some(url) = config.notify.webhook_url.as_deref() {
            let min_level = config.notify.webhook_min_level()?;
            let timeout = Duration::from_secs(config.feed.request_timeout_secs);
            channels.push(Arc::new(WebhookChannel::new(url, timeout)?));
            routes.push(ChannelRoute::new(min_level, channels.len() - 1));
            tracing::info!(url, min_level = %min_level, "Webhook notifications enabled");
        }

        Ok(Self {
            feed,
            evaluator: Arc::new(Mutex::new(evaluator)),
            notifier: Arc::new(NotificationManager::new(channels, routes)),
            toasts,
            config: Arc::new(config),
            start_time: Utc::now(),
        })
    }

    pub fn lock_evaluator(&self) -> MutexGuard<'_, AlertEvaluator> {
        self.evaluator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn locale(&self) -> &str {
        &self.config.locale
    }
}

/// Simulated source when `feed.mock` is set, otherwise the HTTP source at
/// `feed.source_url`.
pub fn build_source(config: &ServerConfig) -> anyhow::Result<Arc<dyn MetricSource>> {
    let feed = &config.feed;
    if feed.mock {
        let latency = Duration::from_millis(feed.simulated_latency_ms);
        return Ok(Arc::new(SimulatedSource::new(latency, config.locale.clone())));
    }

    let url = feed
        .source_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("feed.source_url is required when feed.mock = false"))?;
    let source = HttpSource::new(url, Duration::from_secs(feed.request_timeout_secs))?;
    tracing::info!(endpoint = %source.endpoint(), "Using HTTP metric source");
    Ok(Arc::new(source))
}
