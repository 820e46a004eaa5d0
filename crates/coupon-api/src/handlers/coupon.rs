//! Coupon application handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use validator::Validate;

use coupon_core::error::AppError;
use coupon_core::types::ActorId;
use coupon_entity::quota::QuotaStatus;
use coupon_issuance::{AllocationFailure, AllocationResult};

use crate::dto::request::ApplyRequest;
use crate::dto::response::{ApiResponse, GrantResponse};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// POST /api/coupons/apply
pub async fn apply(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let actor = req
        .actor_id
        .to_actor_id()
        .map_err(|e| AppError::validation(e.to_string()))?;

    Ok(allocation_response(state.engine.apply(&actor).await))
}

/// Maps an allocation outcome to its HTTP response.
pub fn allocation_response(result: AllocationResult) -> Response {
    match result {
        AllocationResult::Granted(grant) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok(GrantResponse::from(grant))),
        )
            .into_response(),
        AllocationResult::DeniedDuplicate => ApiErrorResponse::new(
            "ALREADY_APPLIED",
            "This actor has already applied for the campaign",
        )
        .into_response_with(StatusCode::CONFLICT),
        AllocationResult::DeniedQuotaExhausted => {
            ApiErrorResponse::new("QUOTA_EXHAUSTED", "All coupons have been issued")
                .into_response_with(StatusCode::GONE)
        }
        AllocationResult::Failed(AllocationFailure::CoordinationUnavailable { message }) => {
            ApiErrorResponse::new("COORDINATION_UNAVAILABLE", message)
                .into_retryable_response(StatusCode::SERVICE_UNAVAILABLE)
        }
        AllocationResult::Failed(AllocationFailure::PersistenceInconsistency { grant, message }) => {
            ApiErrorResponse::new("PERSISTENCE_INCONSISTENCY", message)
                .with_details(json!({
                    "grant_id": grant.id.to_string(),
                    "actor_id": grant.actor_id,
                    "slot": grant.slot,
                }))
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/coupons/status
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<QuotaStatus>>> {
    let status = state.engine.status().await?;
    Ok(Json(ApiResponse::ok(status)))
}

/// GET /api/coupons/grants/{actor_id}
pub async fn get_grant(
    State(state): State<AppState>,
    Path(actor_id): Path<String>,
) -> ApiResult<Json<ApiResponse<GrantResponse>>> {
    let actor = ActorId::parse(actor_id).map_err(|e| AppError::validation(e.to_string()))?;

    let grant = state
        .engine
        .grant_for(&actor)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No coupon issued to actor '{actor}'")))?;

    Ok(Json(ApiResponse::ok(GrantResponse::from(grant))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupon_entity::grant::Grant;

    #[test]
    fn test_outcome_status_codes() {
        let grant = Grant::issue("c", &ActorId::from(1u64), 1);
        let cases = [
            (AllocationResult::Granted(grant.clone()), StatusCode::CREATED),
            (AllocationResult::DeniedDuplicate, StatusCode::CONFLICT),
            (AllocationResult::DeniedQuotaExhausted, StatusCode::GONE),
            (
                AllocationResult::Failed(AllocationFailure::CoordinationUnavailable {
                    message: "timeout".to_string(),
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AllocationResult::Failed(AllocationFailure::PersistenceInconsistency {
                    grant,
                    message: "db down".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (result, expected) in cases {
            assert_eq!(allocation_response(result).status(), expected);
        }
    }
}
