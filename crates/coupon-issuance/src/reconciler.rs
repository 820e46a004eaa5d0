//! Quota reconciliation between the coordination store and the grant ledger.
//!
//! A reservation that was never stored shows up as drift: the counter is
//! ahead of stored grants plus journaled failures. The reconciler reports
//! drift and records a snapshot; it never moves the counter itself.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use coupon_core::result::AppResult;
use coupon_core::types::SnapshotId;
use coupon_entity::quota::QuotaSnapshot;

use crate::engine::IssuanceEngine;

/// Number of failed grants replayed per pass when no limit is given.
const DEFAULT_REPLAY_BATCH: usize = 500;

/// What triggered a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// The scheduled cron job.
    Reconciler,
    /// An operator request.
    Manual,
    /// Server startup.
    Startup,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconciler => write!(f, "reconciler"),
            Self::Manual => write!(f, "manual"),
            Self::Startup => write!(f, "startup"),
        }
    }
}

/// Summary of one failed grant replay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Failed grants now stored and marked resolved.
    pub replayed: u64,
    /// Failed grants that could still not be stored.
    pub still_failing: u64,
}

/// Reconciles coordination state with stored grants.
#[derive(Debug, Clone)]
pub struct GrantReconciler {
    engine: Arc<IssuanceEngine>,
}

impl GrantReconciler {
    /// Creates a reconciler for the engine's campaign.
    pub fn new(engine: Arc<IssuanceEngine>) -> Self {
        Self { engine }
    }

    /// Performs one reconciliation pass:
    ///
    /// 1. Read counter and claim set from the store.
    /// 2. Count stored grants and unresolved failures in the ledger.
    /// 3. Compute drift and record a snapshot.
    pub async fn reconcile(&self, source: SnapshotSource) -> AppResult<QuotaSnapshot> {
        let campaign = self.engine.campaign();
        let ledger = self.engine.ledger();

        let status = self.engine.status().await?;
        let stored = ledger.count(campaign).await?;
        let unresolved = ledger.count_unresolved(campaign).await?;

        let issued = to_i64(status.issued);
        let stored_grants = to_i64(stored);
        let unresolved_failures = to_i64(unresolved);
        let drift = issued - stored_grants - unresolved_failures;

        if drift != 0 {
            warn!(
                campaign,
                issued,
                stored_grants,
                unresolved_failures,
                drift,
                "Quota drift detected"
            );
        }

        let snapshot = QuotaSnapshot {
            id: SnapshotId::new(),
            campaign: campaign.to_string(),
            capacity: to_i64(status.capacity),
            issued,
            claimed: to_i64(status.claimed),
            stored_grants,
            unresolved_failures,
            drift,
            source: source.to_string(),
            created_at: Utc::now(),
        };

        if let Err(e) = ledger.record_snapshot(&snapshot).await {
            error!(error = %e, "Failed to save quota snapshot");
        }

        Ok(snapshot)
    }

    /// Reconciles once at startup to surface drift left by a crash.
    pub async fn startup_recovery(&self) -> AppResult<()> {
        info!("Running startup quota reconciliation");

        let snapshot = self.reconcile(SnapshotSource::Startup).await?;

        if snapshot.drift_detected() {
            info!(drift = snapshot.drift, "Startup reconciliation found drift");
        } else {
            info!("Startup reconciliation: quota state is consistent");
        }

        Ok(())
    }

    /// Re-records unresolved failed grants and marks the stored ones resolved.
    pub async fn replay_failed(&self, limit: Option<usize>) -> AppResult<ReplayReport> {
        let campaign = self.engine.campaign();
        let ledger = self.engine.ledger();
        let pending = ledger
            .unresolved_failures(campaign, limit.unwrap_or(DEFAULT_REPLAY_BATCH))
            .await?;

        let mut report = ReplayReport::default();
        for failed in pending {
            match ledger.record(&failed.to_grant()).await {
                Ok(stored) => {
                    ledger.mark_resolved(failed.id).await?;
                    if stored.id != failed.grant_id {
                        warn!(
                            actor_id = %failed.actor_id,
                            journaled = %failed.grant_id,
                            stored = %stored.id,
                            "Actor already held a different grant"
                        );
                    }
                    report.replayed += 1;
                }
                Err(e) => {
                    warn!(failure_id = %failed.id, error = %e, "Failed grant replay failed");
                    report.still_failing += 1;
                }
            }
        }

        info!(
            campaign,
            replayed = report.replayed,
            still_failing = report.still_failing,
            "Failed grant replay completed"
        );
        Ok(report)
    }

    /// Most recent reconciliation snapshots.
    pub async fn history(&self, limit: usize) -> AppResult<Vec<QuotaSnapshot>> {
        self.engine
            .ledger()
            .recent_snapshots(self.engine.campaign(), limit)
            .await
    }

    /// Deletes snapshots older than `retention_days`.
    pub async fn prune_history(&self, retention_days: u32) -> AppResult<u64> {
        let before = Utc::now() - ChronoDuration::days(i64::from(retention_days));
        let removed = self.engine.ledger().prune_snapshots(before).await?;
        if removed > 0 {
            info!(removed, retention_days, "Pruned quota snapshots");
        }
        Ok(removed)
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
