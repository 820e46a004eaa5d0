//! Health check handlers.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use coupon_core::traits::CoordinationStore;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// Upper bound on each dependency probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<DetailedHealthResponse>>) {
    let store_ok = matches!(
        tokio::time::timeout(PROBE_TIMEOUT, state.store.health_check()).await,
        Ok(Ok(true))
    );
    let ledger_ok = matches!(
        tokio::time::timeout(PROBE_TIMEOUT, state.ledger().health_check()).await,
        Ok(Ok(true))
    );

    let label = |ok: bool| if ok { "connected" } else { "unavailable" }.to_string();
    let healthy = store_ok && ledger_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(DetailedHealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            store_provider: state.store.provider_name().to_string(),
            store: label(store_ok),
            ledger: label(ledger_ok),
            campaign: state.engine.campaign().to_string(),
        })),
    )
}
