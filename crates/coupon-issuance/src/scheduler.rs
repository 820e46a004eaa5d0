//! Cron scheduler for periodic reconciliation.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use coupon_core::config::IssuanceConfig;
use coupon_core::error::AppError;

use crate::reconciler::{GrantReconciler, SnapshotSource};

/// Snapshot pruning runs daily at 03:30.
const SNAPSHOT_PRUNE_CRON: &str = "0 30 3 * * *";

/// Runs reconciliation and snapshot pruning on a schedule.
pub struct ReconcileScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Reconciler invoked by the jobs.
    reconciler: Arc<GrantReconciler>,
}

impl std::fmt::Debug for ReconcileScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileScheduler").finish()
    }
}

impl ReconcileScheduler {
    /// Creates a scheduler with no jobs registered.
    pub async fn new(reconciler: Arc<GrantReconciler>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            reconciler,
        })
    }

    /// Registers the jobs enabled by the issuance configuration.
    pub async fn register(&self, config: &IssuanceConfig) -> Result<(), AppError> {
        if config.reconcile_enabled {
            self.register_reconciliation(&config.reconcile_cron).await?;
        }
        self.register_snapshot_pruning(config.snapshot_retention_days)
            .await?;

        info!("Reconciliation jobs registered");
        Ok(())
    }

    /// Starts the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Reconciliation scheduler started");
        Ok(())
    }

    /// Stops the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Reconciliation scheduler shut down");
        Ok(())
    }

    async fn register_reconciliation(&self, cron: &str) -> Result<(), AppError> {
        let reconciler = Arc::clone(&self.reconciler);
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let reconciler = Arc::clone(&reconciler);
            Box::pin(async move {
                if let Err(e) = reconciler.reconcile(SnapshotSource::Reconciler).await {
                    error!(error = %e, "Scheduled reconciliation failed");
                }
            })
        })
        .map_err(|e| AppError::configuration(format!("Invalid reconcile cron '{cron}': {e}")))?;

        self.add(job).await
    }

    async fn register_snapshot_pruning(&self, retention_days: u32) -> Result<(), AppError> {
        let reconciler = Arc::clone(&self.reconciler);
        let job = CronJob::new_async(SNAPSHOT_PRUNE_CRON, move |_uuid, _lock| {
            let reconciler = Arc::clone(&reconciler);
            Box::pin(async move {
                if let Err(e) = reconciler.prune_history(retention_days).await {
                    error!(error = %e, "Snapshot pruning failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create prune job: {e}")))?;

        self.add(job).await
    }

    async fn add(&self, job: CronJob) -> Result<(), AppError> {
        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add job: {e}")))?;
        Ok(())
    }
}
