use crate::api::success_response;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use livewatch_notify::channels::toast::Toast;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 获取当前可见的通知（最新在前），已过期的自动消失通知不返回。
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "通知列表", body = Vec<Toast>)
    )
)]
async fn list_notifications(State(state): State<AppState>) -> impl IntoResponse {
    success_response(StatusCode::OK, state.toasts.active(Utc::now()))
}

#[derive(Serialize, ToSchema)]
struct DismissResponse {
    id: String,
    dismissed: bool,
}

/// 关闭通知。通知不存在时同样返回成功。
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    params(("id" = String, Path, description = "通知 ID")),
    responses(
        (status = 200, description = "已关闭", body = DismissResponse)
    )
)]
async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let dismissed = state.toasts.dismiss(&id);
    success_response(StatusCode::OK, DismissResponse { id, dismissed })
}

pub fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_notifications))
        .routes(routes!(dismiss_notification))
}
