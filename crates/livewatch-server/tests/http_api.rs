mod common;

use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, dashboard_metrics,
    request_json, request_no_body, request_raw,
};
use livewatch_common::dashboard::{Anchor, Category, DashboardData, ProductSales, ProfileSlice};
use livewatch_common::types::TimeSeriesPoint;
use livewatch_server::pipeline;
use serde_json::json;

#[tokio::test]
async fn health_should_return_ok_envelope() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, trace) = request_no_body(&ctx.app, "GET", "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert!(body["data"]["version"].is_string());
    assert_eq!(body["data"]["source"], "fixed");
    assert_eq!(body["data"]["realtime_running"], false);
    assert_eq!(trace.map(|t| t.len()), Some(16));
}

#[tokio::test]
async fn openapi_document_lists_live_commerce_paths() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().expect("paths should exist");
    for path in [
        "/api/health",
        "/api/live-commerce/metrics",
        "/api/live-commerce/series/{key}",
        "/api/live-commerce/realtime/interval",
        "/api/live-commerce/alerts/{id}/read",
        "/api/notifications/{id}",
        "/api/live-commerce/sales-trend",
        "/api/live-commerce/products/{name}/details",
        "/api/live-commerce/orders/{id}/details",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
}

#[tokio::test]
async fn metrics_refresh_replaces_snapshot() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metrics"].as_array().map(Vec::len), Some(0));

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/live-commerce/metrics?refresh=true&time_dimension=today&anchor_id=a1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["metrics"].as_array().map(Vec::len), Some(4));
    assert_eq!(body["data"]["metrics"][0]["key"], "onlineUsers");
    assert_eq!(body["data"]["metrics"][1]["value"], "3.0");
    assert_eq!(body["data"]["loading"], false);
}

#[tokio::test]
async fn metrics_refresh_failure_keeps_last_snapshot() {
    let ctx = build_test_context().expect("test context should build");
    ctx.state.feed.refresh(None).await.expect("first refresh");

    ctx.source.set_failing(true);
    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/metrics?refresh=true").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_err_envelope(&body, 1502);

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metrics"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn series_for_tracked_and_untracked_keys() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/series/onlineUsers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["key"], "onlineUsers");
    assert!(body["data"]["points"].as_array().is_some_and(Vec::is_empty));

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/series/salesAmount").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn orders_and_reset_count() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["orders"].is_array());
    assert_eq!(body["data"]["new_order_count"], 0);

    let (status, body, _) =
        request_no_body(&ctx.app, "POST", "/api/live-commerce/orders/reset-count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn realtime_start_stop_cycle() {
    let ctx = build_test_context().expect("test context should build");

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/realtime").await;
    assert_eq!(body["data"]["running"], false);
    assert_eq!(body["data"]["interval_ms"], 5000);

    let (status, body, _) =
        request_no_body(&ctx.app, "POST", "/api/live-commerce/realtime/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["running"], true);

    let (status, body, _) =
        request_no_body(&ctx.app, "POST", "/api/live-commerce/realtime/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["running"], false);

    // Stopping again is a no-op.
    let (status, _, _) =
        request_no_body(&ctx.app, "POST", "/api/live-commerce/realtime/stop").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn interval_update_clamps_and_validates() {
    let ctx = build_test_context().expect("test context should build");
    let uri = "/api/live-commerce/realtime/interval";

    let (status, body, _) = request_json(&ctx.app, "PUT", uri, json!({"interval_ms": 10})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["interval_ms"], 1000);

    let (status, body, _) = request_json(&ctx.app, "PUT", uri, json!({"interval_ms": 2500})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["interval_ms"], 2500);

    let (status, body, _) = request_json(&ctx.app, "PUT", uri, json!({"interval_ms": -5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let (status, body, _) = request_json(&ctx.app, "PUT", uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let (status, body, _) = request_raw(&ctx.app, "PUT", uri, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    // Rejected requests leave the interval alone.
    assert_eq!(ctx.state.feed.update_interval().as_millis(), 2500);
}

#[tokio::test]
async fn alert_list_mark_read_and_clear() {
    let ctx = build_test_context().expect("test context should build");
    let created = pipeline::handle_snapshot(&ctx.state, &dashboard_metrics(400.0, "1.5")).await;
    assert_eq!(created, 2);

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["unread"], 2);
    assert_eq!(body["data"]["page"], 1);
    let list = body["data"]["list"].as_array().expect("list").clone();
    assert_eq!(list.len(), 2);

    let (_, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/live-commerce/alerts?level=error&page=1&page_size=1",
    )
    .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["list"][0]["rule"]["metric"], "conversionRate");

    let id = list[0]["id"].as_str().expect("id").to_string();
    let uri = format!("/api/live-commerce/alerts/{id}/read");
    let (status, body, _) = request_no_body(&ctx.app, "PUT", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["found"], true);
    assert_eq!(body["data"]["unread"], 1);

    // Idempotent.
    let (_, body, _) = request_no_body(&ctx.app, "PUT", &uri).await;
    assert_eq!(body["data"]["unread"], 1);

    let (status, body, _) =
        request_no_body(&ctx.app, "PUT", "/api/live-commerce/alerts/404/read").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["found"], false);

    let (_, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/alerts?unread_only=true").await;
    assert_eq!(body["data"]["total"], 1);

    let (status, body, _) =
        request_no_body(&ctx.app, "DELETE", "/api/live-commerce/alerts/read").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);
    assert_eq!(body["data"]["remaining"], 1);

    let (status, body, _) = request_no_body(&ctx.app, "DELETE", "/api/live-commerce/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);
    assert_eq!(ctx.state.lock_evaluator().alert_count(), 0);
}

#[tokio::test]
async fn alert_list_rejects_unknown_level() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/alerts?level=fatal").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
}

#[tokio::test]
async fn notifications_follow_alerts_and_can_be_dismissed() {
    let ctx = build_test_context().expect("test context should build");
    pipeline::handle_snapshot(&ctx.state, &dashboard_metrics(400.0, "1.5")).await;

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/notifications").await;
    assert_eq!(status, StatusCode::OK);
    let toasts = body["data"].as_array().expect("toasts").clone();
    assert_eq!(toasts.len(), 2);

    let contents: Vec<&str> = toasts.iter().filter_map(|t| t["content"].as_str()).collect();
    assert!(contents.iter().any(|c| c.starts_with("警告: ")));
    assert!(contents.iter().any(|c| c.starts_with("异常预警: ")));
    let error_toast = toasts
        .iter()
        .find(|t| t["level"] == "error")
        .expect("error toast");
    assert!(error_toast["duration_ms"].is_null());

    let id = error_toast["id"].as_str().expect("id");
    let (status, body, _) =
        request_no_body(&ctx.app, "DELETE", &format!("/api/notifications/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dismissed"], true);

    let (status, body, _) = request_no_body(&ctx.app, "DELETE", "/api/notifications/nope").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dismissed"], false);

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/notifications").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

fn sample_dashboard() -> DashboardData {
    let mut dashboard = DashboardData::default();
    dashboard.sales_trend.sales = (0..24)
        .map(|h| TimeSeriesPoint {
            time: format!("{h:02}:00"),
            value: 20_000.0 + f64::from(h),
        })
        .collect();
    dashboard.products = vec![
        ProductSales {
            name: "华为Mate 60".into(),
            sales: 480,
            revenue: 120_000.0,
            price: 6999.0,
        },
        ProductSales {
            name: "小米14".into(),
            sales: 210,
            revenue: 70_000.0,
            price: 3999.0,
        },
    ];
    dashboard.user_profile.gender = vec![ProfileSlice {
        name: "女性".into(),
        value: 45.0,
        percentage: 45.0,
    }];
    dashboard.user_profile.age = vec![ProfileSlice {
        name: "26-35岁".into(),
        value: 40.0,
        percentage: 40.0,
    }];
    dashboard.anchors = vec![Anchor {
        id: "anchor_1".into(),
        name: "李佳琦".into(),
        followers: 5_000_000,
        is_live: true,
        avatar: None,
    }];
    dashboard.categories = vec![Category {
        id: "category_1".into(),
        name: "手机数码".into(),
        product_count: 320,
        icon: None,
    }];
    dashboard
}

#[tokio::test]
async fn dashboard_panels_follow_refresh() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    ctx.source.set_dashboard(sample_dashboard());
    ctx.state.feed.refresh(None).await.expect("refresh");

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/sales-trend").await;
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["sales"].as_array().map(Vec::len), Some(24));
    assert!(body["data"]["conversion_rate"].is_array());

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/products").await;
    assert_eq!(body["data"][0]["name"], "华为Mate 60");
    assert_eq!(body["data"][1]["sales"], 210);

    let (_, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/user-profile?dimension=gender").await;
    assert_eq!(body["data"]["dimension"], "gender");
    assert_eq!(body["data"]["slices"][0]["name"], "女性");

    // Unknown dimensions fall back to age.
    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/user-profile?dimension=income").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dimension"], "age");
    assert_eq!(body["data"]["slices"][0]["name"], "26-35岁");

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/anchors").await;
    assert_eq!(body["data"][0]["id"], "anchor_1");
    assert_eq!(body["data"][0]["is_live"], true);

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/live-commerce/categories").await;
    assert_eq!(body["data"][0]["id"], "category_1");
}

#[tokio::test]
async fn drill_down_for_metric_product_and_order() {
    let ctx = build_test_context().expect("test context should build");
    ctx.source.set_dashboard(sample_dashboard());

    let uri = "/api/live-commerce/metrics/onlineUsers/details";
    let (status, body, _) = request_no_body(&ctx.app, "GET", uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    ctx.state.feed.refresh(None).await.expect("refresh");

    let (status, body, _) = request_no_body(&ctx.app, "GET", uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metric"]["key"], "onlineUsers");
    assert_eq!(body["data"]["metric"]["value"], 1200.0);
    assert_eq!(body["data"]["hourly_trend"].as_array().map(Vec::len), Some(24));
    assert_eq!(body["data"]["peak_time"]["time"], "20:00-22:00");

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/live-commerce/products/%E5%B0%8F%E7%B1%B314/details",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["name"], "小米14");
    assert_eq!(body["data"]["sales_trend"].as_array().map(Vec::len), Some(7));
    assert_eq!(body["data"]["competitors"].as_array().map(Vec::len), Some(3));

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/products/unknown/details").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/live-commerce/orders/ORDER1/details").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn oversized_body_is_rejected_not_emptied() {
    let ctx = build_test_context().expect("test context should build");
    let padding = "x".repeat(livewatch_server::logging::MAX_REQUEST_BODY_BYTES);
    let body = format!(r#"{{"interval_ms": 2500, "padding": "{padding}"}}"#);

    let (status, body, trace) =
        request_raw(&ctx.app, "PUT", "/api/live-commerce/realtime/interval", &body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_err_envelope(&body, 1413);
    assert!(trace.is_some());
    assert_eq!(ctx.state.feed.update_interval().as_millis(), 5000);
}

#[tokio::test]
async fn bad_webhook_url_fails_state_build() {
    let mut config = livewatch_server::config::ServerConfig::default();
    config.notify.webhook_url = Some("hooks.example.com/no-scheme".into());
    assert!(common::build_test_context_with(config).is_err());
}
