use crate::state::AppState;
use crate::{api, logging};
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_PATH: &str = "/api/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "livewatch API",
        description = "直播电商实时数据看板 REST API",
    ),
    tags(
        (name = "Health", description = "服务健康检查"),
        (name = "Metrics", description = "指标快照与时间序列"),
        (name = "Orders", description = "实时订单"),
        (name = "Dashboard", description = "销售趋势、商品排行、用户画像与筛选项"),
        (name = "Drill-down", description = "指标、商品与订单下钻"),
        (name = "Realtime", description = "实时刷新控制"),
        (name = "Alerts", description = "阈值告警"),
        (name = "Notifications", description = "页面通知")
    )
)]
struct ApiDoc;

pub fn build_http_app(state: AppState) -> Router {
    let (health_router, health_spec) = api::health_routes().split_for_parts();
    let (api_router, api_spec) = api::api_routes().split_for_parts();

    let mut merged_spec = ApiDoc::openapi();
    merged_spec.merge(health_spec);
    merged_spec.merge(api_spec);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    health_router
        .merge(api_router)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url(OPENAPI_PATH, merged_spec))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
