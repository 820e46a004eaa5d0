//! Integration tests for health endpoints.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(1).await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_health_detailed_reports_dependencies() {
    let app = TestApp::new(1).await;

    let response = app.request("GET", "/api/health/detailed", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["store_provider"], "memory");
    assert_eq!(data["store"], "connected");
    assert_eq!(data["ledger"], "connected");
    assert_eq!(data["campaign"], "integration");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new(1).await;

    let response = app.request("GET", "/api/nope", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
