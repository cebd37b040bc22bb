#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use livewatch_common::dashboard::DashboardData;
use livewatch_common::types::{metric_keys, FetchFilters, MetricSnapshot, MetricValue};
use livewatch_feed::error::FeedError;
use livewatch_feed::{FeedFrame, MetricSource};
use livewatch_server::app;
use livewatch_server::config::ServerConfig;
use livewatch_server::state::AppState;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

/// Source that returns whatever metrics the test last set.
pub struct FixedSource {
    metrics: Mutex<Vec<MetricSnapshot>>,
    dashboard: Mutex<DashboardData>,
    fail: AtomicBool,
}

impl FixedSource {
    pub fn new(metrics: Vec<MetricSnapshot>) -> Arc<Self> {
        Arc::new(Self {
            metrics: Mutex::new(metrics),
            dashboard: Mutex::new(DashboardData::default()),
            fail: AtomicBool::new(false),
        })
    }

    pub fn set_metrics(&self, metrics: Vec<MetricSnapshot>) {
        *self.metrics.lock().expect("metrics lock") = metrics;
    }

    pub fn set_dashboard(&self, dashboard: DashboardData) {
        *self.dashboard.lock().expect("dashboard lock") = dashboard;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetricSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch(&self, _filters: Option<&FetchFilters>) -> livewatch_feed::error::Result<FeedFrame> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FeedError::Source("upstream down".into()));
        }
        Ok(FeedFrame {
            metrics: self.metrics.lock().expect("metrics lock").clone(),
            orders: Vec::new(),
            dashboard: self.dashboard.lock().expect("dashboard lock").clone(),
            history: Default::default(),
        })
    }
}

/// The four dashboard metrics the default rules look at.
pub fn dashboard_metrics(online_users: f64, conversion_rate: &str) -> Vec<MetricSnapshot> {
    vec![
        MetricSnapshot::new(
            metric_keys::ONLINE_USERS,
            "实时在线人数",
            MetricValue::Number(online_users),
        ),
        MetricSnapshot::new(
            metric_keys::CONVERSION_RATE,
            "转化率",
            MetricValue::Text(conversion_rate.to_string()),
        ),
        MetricSnapshot::new(
            metric_keys::SALES_AMOUNT,
            "销售额",
            MetricValue::Number(250_000.0),
        ),
        MetricSnapshot::new(
            metric_keys::AVG_ORDER_VALUE,
            "客单价",
            MetricValue::Number(350.0),
        ),
    ]
}

pub struct TestContext {
    pub source: Arc<FixedSource>,
    pub state: AppState,
    pub app: axum::Router,
}

pub fn build_test_context() -> Result<TestContext> {
    build_test_context_with(ServerConfig::default())
}

pub fn build_test_context_with(config: ServerConfig) -> Result<TestContext> {
    let source = FixedSource::new(dashboard_metrics(1200.0, "3.0"));
    let state = AppState::build(config, source.clone())?;
    let app = app::build_http_app(state.clone());

    Ok(TestContext { source, state, app })
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value, Option<String>) {
    request_raw(app, method, uri, &body.to_string()).await
}

pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, req).await
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, req).await
}

pub fn assert_ok_envelope(body: &Value) {
    assert_eq!(body["code"], 0, "unexpected envelope: {body}");
    assert_eq!(body["message"], "success");
}

pub fn assert_err_envelope(body: &Value, code: i64) {
    assert_eq!(body["code"], code, "unexpected envelope: {body}");
    assert!(body["data"].is_null());
    assert!(body["message"].is_string());
}
