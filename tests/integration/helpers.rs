//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use coupon_api::{AppState, build_app};
use coupon_core::config::AppConfig;
use coupon_issuance::MemoryGrantLedger;
use coupon_store::StoreManager;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct access to the engine
    pub state: AppState,
}

/// Response captured from the router
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when the body is not JSON)
    pub body: Value,
}

impl TestApp {
    /// Create an application with the given campaign capacity
    pub async fn new(capacity: u64) -> Self {
        let mut config = AppConfig::default();
        config.issuance.campaign = "integration".to_string();
        config.issuance.capacity = capacity;
        config.issuance.persistence = "memory".to_string();
        config.store.provider = "memory".to_string();

        let store = StoreManager::new(&config.store)
            .await
            .expect("Failed to init store");
        let state = AppState::new(config, store, Arc::new(MemoryGrantLedger::new()));

        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Send a request through the router
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body_str).await
    }

    /// Send a request with an unparsed body
    pub async fn raw_request(&self, method: &str, path: &str, body: String) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Apply for a coupon on behalf of `actor_id`
    pub async fn apply(&self, actor_id: Value) -> TestResponse {
        self.request(
            "POST",
            "/api/coupons/apply",
            Some(serde_json::json!({ "actor_id": actor_id })),
        )
        .await
    }
}
