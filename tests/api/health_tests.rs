//! Health Check API Tests

use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let response = app.server.get("/health/live").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_storage_and_gateway() {
    let app = TestApp::new();

    let response = app.server.get("/health/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["checks"]["storage"]["status"], "healthy");
    assert_eq!(body["checks"]["websocket"]["active_connections"], 0);
}

#[tokio::test]
async fn test_readiness_fails_after_gateway_shutdown() {
    let app = TestApp::new();
    app.state.gateway.shutdown();

    let response = app.server.get("/health/ready").await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_hub_metrics() {
    let app = TestApp::new();
    app.server.get("/health").await.assert_status_ok();

    let response = app.server.get("/metrics").await;

    response.assert_status_ok();
    assert!(response.text().contains("chat_hub_http_requests_total"));
}
