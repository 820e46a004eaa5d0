//! Integration tests for the apply endpoint.

use axum::http::StatusCode;
use futures::future::join_all;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_first_apply_is_granted() {
    let app = TestApp::new(10).await;

    let response = app.apply(json!(1001)).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["actor_id"], "1001");
    assert_eq!(response.body["data"]["slot"], 1);
    assert_eq!(response.body["data"]["campaign"], "integration");
}

#[tokio::test]
async fn test_second_apply_is_conflict() {
    let app = TestApp::new(10).await;

    app.apply(json!("alice")).await;
    let response = app.apply(json!("alice")).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "ALREADY_APPLIED");
}

#[tokio::test]
async fn test_numeric_and_string_ids_are_one_actor() {
    let app = TestApp::new(10).await;

    assert_eq!(app.apply(json!(5)).await.status, StatusCode::CREATED);
    assert_eq!(app.apply(json!("5")).await.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_exhausted_quota_is_gone() {
    let app = TestApp::new(2).await;

    app.apply(json!(1)).await;
    app.apply(json!(2)).await;
    let response = app.apply(json!(3)).await;

    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.body["error"], "QUOTA_EXHAUSTED");
}

#[tokio::test]
async fn test_invalid_actor_ids_are_rejected() {
    let app = TestApp::new(10).await;

    let empty = app.apply(json!("")).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"], "VALIDATION_ERROR");

    let oversized = app.apply(json!("x".repeat(200))).await;
    assert_eq!(oversized.status, StatusCode::BAD_REQUEST);

    let padded = app.apply(json!(" bob ")).await;
    assert_eq!(padded.status, StatusCode::BAD_REQUEST);

    // Nothing reached the engine.
    let status = app.state.engine.status().await.unwrap();
    assert_eq!(status.claimed, 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new(10).await;

    let garbage = app
        .raw_request("POST", "/api/coupons/apply", "{not json".to_string())
        .await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);

    let missing = app
        .request("POST", "/api/coupons/apply", Some(json!({ "user": 1 })))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_applies_respect_quota() {
    let app = TestApp::new(20).await;

    let responses = join_all((0..200u64).map(|id| app.apply(json!(id)))).await;

    let created = responses
        .iter()
        .filter(|r| r.status == StatusCode::CREATED)
        .count();
    let gone = responses
        .iter()
        .filter(|r| r.status == StatusCode::GONE)
        .count();
    assert_eq!(created, 20);
    assert_eq!(gone, 180);
}

#[tokio::test]
async fn test_status_reflects_grants() {
    let app = TestApp::new(3).await;
    app.apply(json!(1)).await;
    app.apply(json!(2)).await;
    app.apply(json!(2)).await;

    let response = app.request("GET", "/api/coupons/status", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["capacity"], 3);
    assert_eq!(data["issued"], 2);
    assert_eq!(data["remaining"], 1);
    assert_eq!(data["claimed"], 2);
}

#[tokio::test]
async fn test_grant_lookup() {
    let app = TestApp::new(3).await;
    app.apply(json!("carol")).await;

    let found = app.request("GET", "/api/coupons/grants/carol", None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["data"]["slot"], 1);

    let missing = app.request("GET", "/api/coupons/grants/dave", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "NOT_FOUND");
}
