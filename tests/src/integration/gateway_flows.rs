//! REST API over a live container, with the WoM server simulated.

use super::fixtures::{accepted_report, connection_request, reward, Node, REPORTS_PATH};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use hub_gateway::{GatewayConfig, GatewayService};
use serde_json::Value;
use shared_types::RewardPeriodType;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const TOKEN: &str = "integration-admin-token";

fn router(node: &Node) -> Router {
    let config = GatewayConfig {
        admin_token: TOKEN.into(),
        ..GatewayConfig::default()
    };
    GatewayService::new(
        config,
        node.container.hub.clone(),
        node.container.reports.clone(),
    )
    .unwrap()
    .with_routes(hub_runtime::metrics_router())
    .router()
}

fn authorized(request: axum::http::request::Builder) -> axum::http::request::Builder {
    request.header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_api_requires_admin_token() {
    let node = Node::start().await;
    let router = router(&node);

    let (status, _) = call(
        &router,
        Request::get("/api/hub/token").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&router, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_token_and_manager_check_proxy_wom() {
    let node = Node::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hubs/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"wom-token-7\""))
        .mount(&node.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/hubs/manager"))
        .and(query_param("nftId", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .mount(&node.server)
        .await;
    let router = router(&node);

    let (status, body) = call(
        &router,
        authorized(Request::get("/api/hub/token"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "wom-token-7");

    let (status, body) = call(
        &router,
        authorized(Request::get(
            "/api/hub/manager?address=0x1111111111111111111111111111111111111111&nftId=3",
        ))
        .body(Body::empty())
        .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "true");
}

#[tokio::test]
async fn test_connect_then_read_hub_and_reports() {
    let node = Node::start().await;
    node.mount_connect().await;
    node.mount_member(Utc::now() - Duration::days(30)).await;
    node.container.platform.rewards.upsert(reward(
        5,
        RewardPeriodType::Week,
        Utc::now() - Duration::days(3),
        true,
    ));
    Mock::given(method("POST"))
        .and(path(REPORTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted_report("0xmanual")))
        .mount(&node.server)
        .await;
    let router = router(&node);

    let (status, body) = call(
        &router,
        authorized(Request::post("/api/hub"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&connection_request()).unwrap()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, node.address.to_string());

    let (status, body) = call(
        &router,
        authorized(Request::get("/api/hub")).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let hub: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(hub["deedId"], 3);

    let (status, body) = call(
        &router,
        authorized(Request::post("/api/hub/reports/5"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["hash"], "0xmanual");

    let (status, body) = call(
        &router,
        authorized(Request::get("/api/hub/reports?offset=0&limit=5"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reports: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["id"], 5);
    assert_eq!(reports[0]["status"], "SENT");
}

#[tokio::test]
async fn test_report_errors_map_to_status_codes() {
    let node = Node::start().await;
    node.container.platform.rewards.upsert(reward(
        6,
        RewardPeriodType::Week,
        Utc::now() - Duration::days(3),
        true,
    ));
    let router = router(&node);

    // Unknown period.
    let (status, _) = call(
        &router,
        authorized(Request::get("/api/hub/reports/99"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Not a federation member.
    let (status, body) = call(
        &router,
        authorized(Request::post("/api/hub/reports/6"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "wom.notConnected");

    // Refresh of a report never sent.
    let (status, body) = call(
        &router,
        authorized(Request::get("/api/hub/reports/6?refresh=true"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "wom.notSentReward");
}

#[tokio::test]
async fn test_metrics_are_public() {
    hub_telemetry::register_metrics().unwrap();
    let node = Node::start().await;
    let router = router(&node);

    let (status, body) = call(&router, Request::get("/metrics").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("hub_federation_requests_total"));
}
