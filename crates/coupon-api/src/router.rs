//! Route definitions for the CouponHub HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with every route and the request logging middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(coupon_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Apply, status, and grant lookup
fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/coupons/apply", post(handlers::coupon::apply))
        .route("/coupons/status", get(handlers::coupon::status))
        .route("/coupons/grants/{actor_id}", get(handlers::coupon::get_grant))
}

/// Reconciliation and failed grant administration
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/reconcile", post(handlers::admin::reconcile))
        .route(
            "/admin/reconcile/history",
            get(handlers::admin::reconcile_history),
        )
        .route("/admin/failed-grants", get(handlers::admin::list_failed_grants))
        .route(
            "/admin/failed-grants/replay",
            post(handlers::admin::replay_failed_grants),
        )
}

/// Liveness and dependency checks
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
