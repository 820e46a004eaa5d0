//! Integration tests for reconciliation administration.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_manual_reconcile_records_snapshot() {
    let app = TestApp::new(5).await;
    app.apply(json!(1)).await;
    app.apply(json!(2)).await;

    let response = app.request("POST", "/api/admin/reconcile", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let snapshot = &response.body["data"];
    assert_eq!(snapshot["issued"], 2);
    assert_eq!(snapshot["stored_grants"], 2);
    assert_eq!(snapshot["drift"], 0);
    assert_eq!(snapshot["source"], "manual");

    let history = app
        .request("GET", "/api/admin/reconcile/history?limit=5", None)
        .await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_failed_grants_empty_when_ledger_healthy() {
    let app = TestApp::new(5).await;
    app.apply(json!(1)).await;

    let listed = app.request("GET", "/api/admin/failed-grants", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["data"], json!([]));

    let replay = app
        .request("POST", "/api/admin/failed-grants/replay", None)
        .await;
    assert_eq!(replay.status, StatusCode::OK);
    assert_eq!(replay.body["data"]["replayed"], 0);
    assert_eq!(replay.body["data"]["still_failing"], 0);
}
