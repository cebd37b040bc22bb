pub mod alerts;
pub mod dashboard;
pub mod live_commerce;
pub mod notifications;
pub mod pagination;

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use livewatch_common::types::Envelope;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 错误响应
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    /// 错误码（非 0）
    pub code: i32,
    /// 错误信息
    pub message: String,
}

pub fn success_response<T>(status: StatusCode, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(Envelope {
            code: 0,
            data: Some(data),
            message: "success".to_string(),
        }),
    )
        .into_response()
}

pub fn success_empty_response(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(Envelope::<Value> {
            code: 0,
            data: None,
            message: msg.to_string(),
        }),
    )
        .into_response()
}

fn to_custom_error_code(code: &str) -> i32 {
    match code {
        "bad_request" => 1001,
        "not_found" => 1004,
        "payload_too_large" => 1413,
        "upstream_error" => 1502,
        "internal_error" => 1500,
        _ => 1999,
    }
}

pub fn error_response(status: StatusCode, trace_id: &str, code: &str, msg: &str) -> Response {
    tracing::debug!(trace_id, code, msg, "Request rejected");
    (
        status,
        Json(Envelope::<Value> {
            code: to_custom_error_code(code),
            data: None,
            message: msg.to_string(),
        }),
    )
        .into_response()
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// 服务版本号
    version: String,
    /// 运行时长（秒）
    uptime_secs: i64,
    /// 数据源（simulated / http）
    source: String,
    /// 实时刷新是否运行中
    realtime_running: bool,
}

/// 获取服务健康状态。
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "服务健康状态", body = HealthResponse)
    )
)]
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    success_response(
        StatusCode::OK,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime,
            source: state.feed.source_name().to_string(),
            realtime_running: state.feed.is_running(),
        },
    )
}

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health))
}

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(live_commerce::live_commerce_routes())
        .merge(dashboard::dashboard_routes())
        .merge(alerts::alert_routes())
        .merge(notifications::notification_routes())
}
