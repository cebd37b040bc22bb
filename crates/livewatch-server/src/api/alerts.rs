use crate::api::pagination::PaginationParams;
use crate::api::{error_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use livewatch_common::types::{AlertLevel, AlertMessage};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// 告警列表筛选
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertFilterParams {
    /// 告警级别（info / warning / error）
    #[param(required = false)]
    pub level: Option<String>,
    /// 仅返回未读告警
    #[param(required = false)]
    pub unread_only: Option<bool>,
}

/// 告警分页数据
#[derive(Serialize, ToSchema)]
struct AlertPage {
    /// 最新在前
    list: Vec<AlertMessage>,
    /// 筛选后的总数
    total: usize,
    page: usize,
    page_size: usize,
    /// 全部未读告警数
    unread: usize,
}

/// 分页查询告警（最新在前）。
#[utoipa::path(
    get,
    path = "/api/live-commerce/alerts",
    tag = "Alerts",
    params(PaginationParams, AlertFilterParams),
    responses(
        (status = 200, description = "告警分页列表", body = AlertPage),
        (status = 400, description = "参数错误", body = crate::api::ApiError)
    )
)]
async fn list_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<AlertFilterParams>,
) -> impl IntoResponse {
    let level = match filter.level.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<AlertLevel>() {
            Ok(level) => Some(level),
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, &trace_id, "bad_request", &e);
            }
        },
        None => None,
    };
    let unread_only = filter.unread_only.unwrap_or(false);

    let (matching, unread) = {
        let evaluator = state.lock_evaluator();
        let matching: Vec<AlertMessage> = evaluator
            .alerts()
            .iter()
            .filter(|a| level.map_or(true, |wanted| wanted == a.level))
            .filter(|a| !unread_only || !a.read)
            .cloned()
            .collect();
        (matching, evaluator.unread_count())
    };

    success_response(
        StatusCode::OK,
        AlertPage {
            list: pagination.apply(&matching),
            total: matching.len(),
            page: pagination.page(),
            page_size: pagination.page_size(),
            unread,
        },
    )
}

/// 标记结果
#[derive(Serialize, ToSchema)]
struct MarkReadResponse {
    id: String,
    /// 是否找到该告警
    found: bool,
    unread: usize,
}

/// 将告警标记为已读。告警不存在时同样返回成功。
#[utoipa::path(
    put,
    path = "/api/live-commerce/alerts/{id}/read",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    responses(
        (status = 200, description = "已标记", body = MarkReadResponse)
    )
)]
async fn mark_alert_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let (found, unread) = {
        let mut evaluator = state.lock_evaluator();
        let found = evaluator.mark_read(&id);
        (found, evaluator.unread_count())
    };
    success_response(StatusCode::OK, MarkReadResponse { id, found, unread })
}

/// 清除结果
#[derive(Serialize, ToSchema)]
struct ClearResponse {
    /// 删除的告警数
    removed: usize,
    /// 剩余告警数
    remaining: usize,
}

/// 清空全部告警。
#[utoipa::path(
    delete,
    path = "/api/live-commerce/alerts",
    tag = "Alerts",
    responses(
        (status = 200, description = "已清空", body = ClearResponse)
    )
)]
async fn clear_alerts(State(state): State<AppState>) -> impl IntoResponse {
    let removed = {
        let mut evaluator = state.lock_evaluator();
        let removed = evaluator.alert_count();
        evaluator.clear_all();
        removed
    };
    tracing::info!(removed, "Alerts cleared");
    success_response(
        StatusCode::OK,
        ClearResponse {
            removed,
            remaining: 0,
        },
    )
}

/// 清除已读告警。
#[utoipa::path(
    delete,
    path = "/api/live-commerce/alerts/read",
    tag = "Alerts",
    responses(
        (status = 200, description = "已清除", body = ClearResponse)
    )
)]
async fn clear_read_alerts(State(state): State<AppState>) -> impl IntoResponse {
    let (removed, remaining) = {
        let mut evaluator = state.lock_evaluator();
        let removed = evaluator.clear_read();
        (removed, evaluator.alert_count())
    };
    success_response(StatusCode::OK, ClearResponse { removed, remaining })
}

pub fn alert_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_alerts, clear_alerts))
        .routes(routes!(mark_alert_read))
        .routes(routes!(clear_read_alerts))
}
