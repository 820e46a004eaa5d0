//! Application builder and server runner.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use coupon_core::config::AppConfig;
use coupon_core::error::AppError;
use coupon_issuance::{ReconcileScheduler, ledger};
use coupon_store::StoreManager;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();

    build_router(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds),
        ))
        .layer(build_cors_layer(&server.cors))
        .layer(TraceLayer::new_for_http())
}

/// Runs the CouponHub server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!(
        campaign = %config.issuance.campaign,
        capacity = config.issuance.capacity,
        "Starting CouponHub v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Step 1: Coordination store ───────────────────────────────
    let store = StoreManager::new(&config.store).await?;
    info!(provider = store.provider_name(), "Coordination store ready");

    // ── Step 2: Grant ledger (connects and migrates) ─────────────
    let grant_ledger = ledger::connect(&config.issuance, &config.database).await?;

    // ── Step 3: Engine, reconciler, shared state ─────────────────
    let state = AppState::new(config.clone(), store, grant_ledger);

    // ── Step 4: Startup reconciliation ───────────────────────────
    if let Err(e) = state.reconciler.startup_recovery().await {
        warn!(error = %e, "Startup reconciliation failed, continuing");
    }

    // ── Step 5: Reconciliation scheduler ─────────────────────────
    let mut scheduler = ReconcileScheduler::new(Arc::clone(&state.reconciler)).await?;
    scheduler.register(&config.issuance).await?;
    scheduler.start().await?;

    // ── Step 6: Build and start HTTP server ──────────────────────
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("CouponHub server listening on {addr}");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 8: Stop background jobs ─────────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    match tokio::time::timeout(grace, scheduler.shutdown()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Scheduler shutdown failed"),
        Err(_) => warn!("Scheduler did not stop within the grace period"),
    }

    info!("CouponHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
