//! In-memory grant ledger for single-node deployments and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use coupon_core::result::AppResult;
use coupon_core::types::ActorId;
use coupon_entity::grant::{FailedGrant, Grant};
use coupon_entity::quota::QuotaSnapshot;

use super::GrantLedger;

/// Process-local grant ledger. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryGrantLedger {
    /// Grants keyed by (campaign, actor).
    grants: DashMap<(String, String), Grant>,
    /// Failed grant journal keyed by entry ID.
    failures: DashMap<Uuid, FailedGrant>,
    /// Snapshots in insertion order.
    snapshots: RwLock<Vec<QuotaSnapshot>>,
}

impl MemoryGrantLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrantLedger for MemoryGrantLedger {
    async fn record(&self, grant: &Grant) -> AppResult<Grant> {
        let key = (grant.campaign.clone(), grant.actor_id.clone());
        let stored = self
            .grants
            .entry(key)
            .or_insert_with(|| grant.clone())
            .clone();
        Ok(stored)
    }

    async fn find_by_actor(&self, campaign: &str, actor: &ActorId) -> AppResult<Option<Grant>> {
        let key = (campaign.to_string(), actor.as_str().to_string());
        Ok(self.grants.get(&key).map(|g| g.clone()))
    }

    async fn count(&self, campaign: &str) -> AppResult<u64> {
        Ok(self
            .grants
            .iter()
            .filter(|g| g.campaign == campaign)
            .count() as u64)
    }

    async fn record_failure(&self, failed: &FailedGrant) -> AppResult<()> {
        self.failures.insert(failed.id, failed.clone());
        Ok(())
    }

    async fn unresolved_failures(
        &self,
        campaign: &str,
        limit: usize,
    ) -> AppResult<Vec<FailedGrant>> {
        let mut pending: Vec<FailedGrant> = self
            .failures
            .iter()
            .filter(|f| f.campaign == campaign && !f.is_resolved())
            .map(|f| f.clone())
            .collect();
        pending.sort_by_key(|f| f.failed_at);
        pending.truncate(limit);
        Ok(pending)
    }

    async fn count_unresolved(&self, campaign: &str) -> AppResult<u64> {
        Ok(self
            .failures
            .iter()
            .filter(|f| f.campaign == campaign && !f.is_resolved())
            .count() as u64)
    }

    async fn mark_resolved(&self, failure_id: Uuid) -> AppResult<bool> {
        match self.failures.get_mut(&failure_id) {
            Some(mut failed) if !failed.is_resolved() => {
                failed.resolved_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_snapshot(&self, snapshot: &QuotaSnapshot) -> AppResult<()> {
        self.snapshots.write().await.push(snapshot.clone());
        Ok(())
    }

    async fn recent_snapshots(&self, campaign: &str, limit: usize) -> AppResult<Vec<QuotaSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots
            .iter()
            .rev()
            .filter(|s| s.campaign == campaign)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn prune_snapshots(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut snapshots = self.snapshots.write().await;
        let len = snapshots.len();
        snapshots.retain(|s| s.created_at >= before);
        Ok((len - snapshots.len()) as u64)
    }

    async fn clear_campaign(&self, campaign: &str) -> AppResult<()> {
        self.grants.retain(|(c, _), _| c != campaign);
        self.failures.retain(|_, f| f.campaign != campaign);
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
