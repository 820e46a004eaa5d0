//! # coupon-api
//!
//! HTTP API layer for CouponHub built on Axum.
//!
//! Exposes the apply endpoint, quota status, grant lookup, reconciliation
//! administration, and health checks. Maps allocation outcomes and
//! `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
