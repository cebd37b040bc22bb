use crate::api::{error_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use livewatch_common::dashboard::{
    Anchor, Category, MetricDetails, OrderDetails, ProductDetails, ProductSales, ProfileDimension,
    ProfileSlice, SalesTrend,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// 获取今日分时销售趋势（销售额、订单量、转化率）。
#[utoipa::path(
    get,
    path = "/api/live-commerce/sales-trend",
    tag = "Dashboard",
    responses(
        (status = 200, description = "分时销售趋势", body = SalesTrend)
    )
)]
async fn get_sales_trend(State(state): State<AppState>) -> impl IntoResponse {
    success_response(StatusCode::OK, state.feed.sales_trend())
}

/// 获取商品销量排行（销量降序）。
#[utoipa::path(
    get,
    path = "/api/live-commerce/products",
    tag = "Dashboard",
    responses(
        (status = 200, description = "商品销量排行", body = Vec<ProductSales>)
    )
)]
async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    success_response(StatusCode::OK, state.feed.products())
}

/// 用户画像查询参数
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileQuery {
    /// age / gender / region，缺省或无法识别时为 age
    pub dimension: Option<String>,
}

/// 用户画像
#[derive(Serialize, ToSchema)]
struct ProfileResponse {
    dimension: ProfileDimension,
    slices: Vec<ProfileSlice>,
}

/// 获取用户画像分布。
#[utoipa::path(
    get,
    path = "/api/live-commerce/user-profile",
    tag = "Dashboard",
    params(ProfileQuery),
    responses(
        (status = 200, description = "用户画像", body = ProfileResponse)
    )
)]
async fn get_user_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> impl IntoResponse {
    let dimension = query
        .dimension
        .as_deref()
        .and_then(|d| d.parse::<ProfileDimension>().ok())
        .unwrap_or_default();
    let profile = state.feed.user_profile();
    success_response(
        StatusCode::OK,
        ProfileResponse {
            dimension,
            slices: profile.slices(dimension).to_vec(),
        },
    )
}

/// 获取主播列表（anchor_id 筛选项）。
#[utoipa::path(
    get,
    path = "/api/live-commerce/anchors",
    tag = "Dashboard",
    responses(
        (status = 200, description = "主播列表", body = Vec<Anchor>)
    )
)]
async fn list_anchors(State(state): State<AppState>) -> impl IntoResponse {
    success_response(StatusCode::OK, state.feed.anchors())
}

/// 获取商品类目列表（category_id 筛选项）。
#[utoipa::path(
    get,
    path = "/api/live-commerce/categories",
    tag = "Dashboard",
    responses(
        (status = 200, description = "商品类目", body = Vec<Category>)
    )
)]
async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    success_response(StatusCode::OK, state.feed.categories())
}

/// 指标下钻：分时趋势、热销商品、峰值时段与同比数据。
#[utoipa::path(
    get,
    path = "/api/live-commerce/metrics/{key}/details",
    tag = "Drill-down",
    params(("key" = String, Path, description = "指标 key")),
    responses(
        (status = 200, description = "指标详情", body = MetricDetails),
        (status = 404, description = "当前快照中无该指标", body = crate::api::ApiError)
    )
)]
async fn get_metric_details(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.feed.metric_details(&key) {
        Some(details) => success_response(StatusCode::OK, details),
        None => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Metric '{key}' is not in the current snapshot"),
        ),
    }
}

/// 商品下钻：近 7 日销量、评价、库存与竞品。
#[utoipa::path(
    get,
    path = "/api/live-commerce/products/{name}/details",
    tag = "Drill-down",
    params(("name" = String, Path, description = "商品名称")),
    responses(
        (status = 200, description = "商品详情", body = ProductDetails),
        (status = 404, description = "排行中无该商品", body = crate::api::ApiError)
    )
)]
async fn get_product_details(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.feed.product_details(&name) {
        Some(details) => success_response(StatusCode::OK, details),
        None => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Product '{name}' is not ranked"),
        ),
    }
}

/// 订单下钻：买家、支付、物流与历史订单。
#[utoipa::path(
    get,
    path = "/api/live-commerce/orders/{id}/details",
    tag = "Drill-down",
    params(("id" = String, Path, description = "订单 ID")),
    responses(
        (status = 200, description = "订单详情", body = OrderDetails),
        (status = 404, description = "订单不在最近订单中", body = crate::api::ApiError)
    )
)]
async fn get_order_details(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.feed.order_details(&id) {
        Some(details) => success_response(StatusCode::OK, details),
        None => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Order '{id}' not found"),
        ),
    }
}

pub fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_sales_trend))
        .routes(routes!(list_products))
        .routes(routes!(get_user_profile))
        .routes(routes!(list_anchors))
        .routes(routes!(list_categories))
        .routes(routes!(get_metric_details))
        .routes(routes!(get_product_details))
        .routes(routes!(get_order_details))
}
