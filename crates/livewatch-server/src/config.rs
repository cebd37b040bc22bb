use livewatch_alert::rules::{build_rules, default_rules, RuleConfig};
use livewatch_common::types::{AlertLevel, AlertRule};
use livewatch_feed::FeedOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_HTTP_PORT: &str = "LIVEWATCH_HTTP_PORT";
pub const ENV_MOCK: &str = "LIVEWATCH_MOCK";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// 通知与规则文案语言（zh-CN / en-US）
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// 使用内置模拟数据源
    #[serde(default = "default_mock")]
    pub mock: bool,
    /// 远程数据源地址，`mock = false` 时必填
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
    #[serde(default = "default_series_capacity")]
    pub series_capacity: usize,
    #[serde(default = "default_tracked_series")]
    pub tracked_series: Vec<String>,
    #[serde(default = "default_max_orders")]
    pub max_orders: usize,
    /// 启动后自动开启实时刷新
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            mock: default_mock(),
            source_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            update_interval_ms: default_update_interval_ms(),
            simulated_latency_ms: default_simulated_latency_ms(),
            series_capacity: default_series_capacity(),
            tracked_series: default_tracked_series(),
            max_orders: default_max_orders(),
            autostart: default_autostart(),
        }
    }
}

impl FeedConfig {
    pub fn options(&self) -> FeedOptions {
        FeedOptions {
            update_interval: Duration::from_millis(self.update_interval_ms),
            series_capacity: self.series_capacity,
            tracked_series: self.tracked_series.clone(),
            max_orders: self.max_orders,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
    /// 是否加载内置的四条默认规则
    #[serde(default = "default_use_default_rules")]
    pub use_default_rules: bool,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_alerts: default_max_alerts(),
            use_default_rules: default_use_default_rules(),
            rules: Vec::new(),
        }
    }
}

impl AlertConfig {
    /// Built-in rules (if enabled) followed by the configured ones.
    pub fn build_rules(&self, locale: &str) -> anyhow::Result<Vec<AlertRule>> {
        let mut rules = if self.use_default_rules {
            default_rules(locale)
        } else {
            Vec::new()
        };
        rules.extend(build_rules(&self.rules)?);
        Ok(rules)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_toast_capacity")]
    pub toast_capacity: usize,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_min_level")]
    pub webhook_min_level: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            toast_capacity: default_toast_capacity(),
            webhook_url: None,
            webhook_min_level: default_webhook_min_level(),
        }
    }
}

impl NotifyConfig {
    pub fn webhook_min_level(&self) -> anyhow::Result<AlertLevel> {
        self.webhook_min_level
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Invalid notify.webhook_min_level: {e}"))
    }
}

fn default_http_port() -> u16 {
    8080
}

fn default_locale() -> String {
    livewatch_common::i18n::DEFAULT_LOCALE.to_string()
}

fn default_mock() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_update_interval_ms() -> u64 {
    5000
}

fn default_simulated_latency_ms() -> u64 {
    500
}

fn default_series_capacity() -> usize {
    60
}

fn default_tracked_series() -> Vec<String> {
    vec![livewatch_common::types::metric_keys::ONLINE_USERS.to_string()]
}

fn default_max_orders() -> usize {
    20
}

fn default_autostart() -> bool {
    true
}

fn default_max_alerts() -> usize {
    livewatch_alert::evaluator::DEFAULT_MAX_ALERTS
}

fn default_use_default_rules() -> bool {
    true
}

fn default_toast_capacity() -> usize {
    100
}

fn default_webhook_min_level() -> String {
    "warning".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            locale: default_locale(),
            feed: FeedConfig::default(),
            alert: AlertConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`ServerConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::info!(path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `LIVEWATCH_HTTP_PORT` and `LIVEWATCH_MOCK` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_HTTP_PORT) {
            self.http_port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {ENV_HTTP_PORT} '{port}': {e}"))?;
        }
        if let Some(mock) = lookup(ENV_MOCK) {
            self.feed.mock = match mock.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => anyhow::bail!("Invalid {ENV_MOCK} '{other}': expected true or false"),
            };
        }
        Ok(())
    }
}
