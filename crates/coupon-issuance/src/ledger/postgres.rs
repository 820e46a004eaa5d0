//! PostgreSQL-backed grant ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use coupon_core::result::AppResult;
use coupon_core::types::ActorId;
use coupon_database::GrantDatabase;
use coupon_database::repositories::{
    FailedGrantRepository, GrantRepository, QuotaSnapshotRepository,
};
use coupon_entity::grant::{FailedGrant, Grant};
use coupon_entity::quota::QuotaSnapshot;

use super::GrantLedger;

/// Grant ledger over the `grants`, `failed_grants`, and `quota_snapshots` tables.
#[derive(Debug, Clone)]
pub struct PgGrantLedger {
    db: GrantDatabase,
    grants: GrantRepository,
    failures: FailedGrantRepository,
    snapshots: QuotaSnapshotRepository,
}

impl PgGrantLedger {
    /// Creates a ledger sharing one connection pool across its repositories.
    pub fn new(db: GrantDatabase) -> Self {
        let (grants, failures, snapshots) = db.repositories();
        Self {
            db,
            grants,
            failures,
            snapshots,
        }
    }
}

fn row_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl GrantLedger for PgGrantLedger {
    async fn record(&self, grant: &Grant) -> AppResult<Grant> {
        self.grants.insert_idempotent(grant).await
    }

    async fn find_by_actor(&self, campaign: &str, actor: &ActorId) -> AppResult<Option<Grant>> {
        self.grants.find_by_actor(campaign, actor.as_str()).await
    }

    async fn count(&self, campaign: &str) -> AppResult<u64> {
        self.grants.count(campaign).await
    }

    async fn record_failure(&self, failed: &FailedGrant) -> AppResult<()> {
        self.failures.create(failed).await
    }

    async fn unresolved_failures(
        &self,
        campaign: &str,
        limit: usize,
    ) -> AppResult<Vec<FailedGrant>> {
        self.failures
            .find_unresolved(campaign, row_limit(limit))
            .await
    }

    async fn count_unresolved(&self, campaign: &str) -> AppResult<u64> {
        self.failures.count_unresolved(campaign).await
    }

    async fn mark_resolved(&self, failure_id: Uuid) -> AppResult<bool> {
        self.failures.mark_resolved(failure_id).await
    }

    async fn record_snapshot(&self, snapshot: &QuotaSnapshot) -> AppResult<()> {
        self.snapshots.create(snapshot).await
    }

    async fn recent_snapshots(&self, campaign: &str, limit: usize) -> AppResult<Vec<QuotaSnapshot>> {
        self.snapshots
            .find_recent(campaign, row_limit(limit))
            .await
    }

    async fn prune_snapshots(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.snapshots.cleanup_old(before).await
    }

    async fn clear_campaign(&self, campaign: &str) -> AppResult<()> {
        self.failures.delete_campaign(campaign).await?;
        self.grants.delete_campaign(campaign).await?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.probe().await
    }
}
