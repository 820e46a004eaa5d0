//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use coupon_core::config::AppConfig;
use coupon_issuance::{GrantLedger, GrantReconciler, IssuanceEngine};
use coupon_store::StoreManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Coordination store (Redis or in-memory)
    pub store: StoreManager,
    /// Allocation engine for the configured campaign
    pub engine: Arc<IssuanceEngine>,
    /// Drift detection and failed grant replay
    pub reconciler: Arc<GrantReconciler>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds the engine and reconciler over the given store and ledger.
    pub fn new(config: AppConfig, store: StoreManager, ledger: Arc<dyn GrantLedger>) -> Self {
        let engine = Arc::new(IssuanceEngine::from_config(
            Arc::new(store.clone()),
            ledger,
            &config,
        ));
        let reconciler = Arc::new(GrantReconciler::new(Arc::clone(&engine)));

        Self {
            config: Arc::new(config),
            store,
            engine,
            reconciler,
            started_at: Instant::now(),
        }
    }

    /// The grant ledger behind the engine.
    pub fn ledger(&self) -> &Arc<dyn GrantLedger> {
        self.engine.ledger()
    }
}
