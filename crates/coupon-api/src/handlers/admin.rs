//! Reconciliation and failed grant administration.

use axum::Json;
use axum::extract::{Query, State};

use coupon_entity::grant::FailedGrant;
use coupon_entity::quota::QuotaSnapshot;
use coupon_issuance::{ReplayReport, SnapshotSource};

use crate::dto::request::LimitParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/admin/reconcile
pub async fn reconcile(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<QuotaSnapshot>>> {
    let snapshot = state.reconciler.reconcile(SnapshotSource::Manual).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

/// GET /api/admin/reconcile/history
pub async fn reconcile_history(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<ApiResponse<Vec<QuotaSnapshot>>>> {
    let history = state.reconciler.history(params.clamped()).await?;
    Ok(Json(ApiResponse::ok(history)))
}

/// GET /api/admin/failed-grants
pub async fn list_failed_grants(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<ApiResponse<Vec<FailedGrant>>>> {
    let failures = state
        .ledger()
        .unresolved_failures(state.engine.campaign(), params.clamped())
        .await?;
    Ok(Json(ApiResponse::ok(failures)))
}

/// POST /api/admin/failed-grants/replay
pub async fn replay_failed_grants(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<ApiResponse<ReplayReport>>> {
    let report = state.reconciler.replay_failed(Some(params.clamped())).await?;
    Ok(Json(ApiResponse::ok(report)))
}
