use crate::api::{error_response, success_empty_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use livewatch_common::types::{FetchFilters, MetricSnapshot, OrderRecord, TimeSeriesPoint};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// 指标查询参数
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MetricsQuery {
    /// 为 true 时先从数据源刷新再返回
    #[serde(default)]
    pub refresh: Option<bool>,
    /// 时间维度（realtime / today / week / month）
    pub time_dimension: Option<String>,
    /// 主播 ID
    pub anchor_id: Option<String>,
    /// 商品类目 ID
    pub category_id: Option<String>,
    /// 开始日期
    pub start_date: Option<String>,
    /// 结束日期
    pub end_date: Option<String>,
}

impl MetricsQuery {
    fn filters(&self) -> FetchFilters {
        FetchFilters {
            time_dimension: self.time_dimension.clone(),
            anchor_id: self.anchor_id.clone(),
            category_id: self.category_id.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

/// 当前指标快照
#[derive(Serialize, ToSchema)]
struct MetricsResponse {
    metrics: Vec<MetricSnapshot>,
    /// 是否有刷新请求进行中
    loading: bool,
}

/// 获取当前指标快照。
/// `refresh=true` 时按筛选条件从数据源拉取一次；拉取失败时保留上一次快照并返回错误。
#[utoipa::path(
    get,
    path = "/api/live-commerce/metrics",
    tag = "Metrics",
    params(MetricsQuery),
    responses(
        (status = 200, description = "指标快照", body = MetricsResponse),
        (status = 502, description = "数据源拉取失败", body = crate::api::ApiError)
    )
)]
async fn get_metrics(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> impl IntoResponse {
    if query.refresh.unwrap_or(false) {
        let filters = query.filters();
        if let Err(e) = state.feed.refresh(Some(&filters)).await {
            return error_response(
                StatusCode::BAD_GATEWAY,
                &trace_id,
                "upstream_error",
                &e.to_string(),
            );
        }
    }

    success_response(
        StatusCode::OK,
        MetricsResponse {
            metrics: state.feed.snapshot(),
            loading: state.feed.is_loading(),
        },
    )
}

/// 时间序列
#[derive(Serialize, ToSchema)]
struct SeriesResponse {
    key: String,
    /// 按时间升序
    points: Vec<TimeSeriesPoint>,
}

/// 获取指定指标的时间序列（仅限已跟踪的指标）。
#[utoipa::path(
    get,
    path = "/api/live-commerce/series/{key}",
    tag = "Metrics",
    params(("key" = String, Path, description = "指标 key，如 onlineUsers")),
    responses(
        (status = 200, description = "时间序列", body = SeriesResponse),
        (status = 404, description = "未跟踪该指标", body = crate::api::ApiError)
    )
)]
async fn get_series(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.feed.series(&key) {
        Some(points) => success_response(StatusCode::OK, SeriesResponse { key, points }),
        None => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Series '{key}' is not tracked"),
        ),
    }
}

/// 实时订单
#[derive(Serialize, ToSchema)]
struct OrdersResponse {
    /// 最新在前
    orders: Vec<OrderRecord>,
    /// 上次清零后新增的订单数
    new_order_count: u64,
}

/// 获取最近订单。
#[utoipa::path(
    get,
    path = "/api/live-commerce/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "最近订单", body = OrdersResponse)
    )
)]
async fn list_orders(State(state): State<AppState>) -> impl IntoResponse {
    success_response(
        StatusCode::OK,
        OrdersResponse {
            orders: state.feed.orders(),
            new_order_count: state.feed.new_order_count(),
        },
    )
}

/// 新订单计数清零。
#[utoipa::path(
    post,
    path = "/api/live-commerce/orders/reset-count",
    tag = "Orders",
    responses(
        (status = 200, description = "已清零")
    )
)]
async fn reset_order_count(State(state): State<AppState>) -> impl IntoResponse {
    state.feed.reset_new_order_count();
    success_empty_response(StatusCode::OK, "success")
}

/// 实时刷新状态
#[derive(Serialize, ToSchema)]
struct RealtimeStatus {
    running: bool,
    /// 刷新间隔（毫秒）
    interval_ms: u64,
    loading: bool,
    /// 数据源名称
    source: String,
}

impl RealtimeStatus {
    fn of(state: &AppState) -> Self {
        Self {
            running: state.feed.is_running(),
            interval_ms: u64::try_from(state.feed.update_interval().as_millis())
                .unwrap_or(u64::MAX),
            loading: state.feed.is_loading(),
            source: state.feed.source_name().to_string(),
        }
    }
}

/// 获取实时刷新状态。
#[utoipa::path(
    get,
    path = "/api/live-commerce/realtime",
    tag = "Realtime",
    responses(
        (status = 200, description = "实时刷新状态", body = RealtimeStatus)
    )
)]
async fn realtime_status(State(state): State<AppState>) -> impl IntoResponse {
    success_response(StatusCode::OK, RealtimeStatus::of(&state))
}

/// 开启实时刷新。已运行时按当前间隔重启。
#[utoipa::path(
    post,
    path = "/api/live-commerce/realtime/start",
    tag = "Realtime",
    responses(
        (status = 200, description = "已开启", body = RealtimeStatus)
    )
)]
async fn start_realtime(State(state): State<AppState>) -> impl IntoResponse {
    state.feed.start_periodic_update();
    success_response(StatusCode::OK, RealtimeStatus::of(&state))
}

/// 停止实时刷新。未运行时不做任何操作。
#[utoipa::path(
    post,
    path = "/api/live-commerce/realtime/stop",
    tag = "Realtime",
    responses(
        (status = 200, description = "已停止", body = RealtimeStatus)
    )
)]
async fn stop_realtime(State(state): State<AppState>) -> impl IntoResponse {
    state.feed.stop_periodic_update();
    success_response(StatusCode::OK, RealtimeStatus::of(&state))
}

/// 修改刷新间隔请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct IntervalRequest {
    /// 刷新间隔（毫秒），小于 1000 时按 1000 处理
    pub interval_ms: Option<i64>,
}

/// 修改实时刷新间隔。运行中的定时器会以新间隔重启，历史数据保留。
#[utoipa::path(
    put,
    path = "/api/live-commerce/realtime/interval",
    tag = "Realtime",
    request_body = IntervalRequest,
    responses(
        (status = 200, description = "已更新", body = RealtimeStatus),
        (status = 400, description = "参数错误", body = crate::api::ApiError)
    )
)]
async fn set_interval(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    body: Result<Json<IntervalRequest>, JsonRejection>,
) -> impl IntoResponse {
    let interval_ms = match body {
        Ok(Json(IntervalRequest {
            interval_ms: Some(ms),
        })) => ms,
        Ok(Json(IntervalRequest { interval_ms: None })) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                "interval_ms is required",
            );
        }
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                &e.body_text(),
            );
        }
    };

    let Ok(interval_ms) = u64::try_from(interval_ms) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "interval_ms must not be negative",
        );
    };

    let effective = state
        .feed
        .set_update_interval(Duration::from_millis(interval_ms));
    tracing::info!(
        requested_ms = interval_ms,
        effective_ms = effective.as_millis() as u64,
        "Update interval changed"
    );
    success_response(StatusCode::OK, RealtimeStatus::of(&state))
}

pub fn live_commerce_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_metrics))
        .routes(routes!(get_series))
        .routes(routes!(list_orders))
        .routes(routes!(reset_order_count))
        .routes(routes!(realtime_status))
        .routes(routes!(start_realtime))
        .routes(routes!(stop_realtime))
        .routes(routes!(set_interval))
}
