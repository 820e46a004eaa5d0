//! Failure handling: unavailable stores and ledgers that refuse writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use coupon_core::error::AppError;
use coupon_core::result::AppResult;
use coupon_core::traits::CoordinationStore;
use coupon_core::types::ActorId;
use coupon_entity::grant::{FailedGrant, Grant};
use coupon_entity::quota::QuotaSnapshot;
use coupon_issuance::{
    AllocationFailure, AllocationResult, GrantLedger, GrantReconciler, IssuanceEngine,
    MemoryGrantLedger,
};
use coupon_store::memory::MemoryStore;

/// Ledger whose grant writes fail while `failing` is set.
#[derive(Debug, Default)]
struct FlakyLedger {
    inner: MemoryGrantLedger,
    failing: AtomicBool,
}

#[async_trait]
impl GrantLedger for FlakyLedger {
    async fn record(&self, grant: &Grant) -> AppResult<Grant> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::database("connection reset"));
        }
        self.inner.record(grant).await
    }

    async fn find_by_actor(&self, campaign: &str, actor: &ActorId) -> AppResult<Option<Grant>> {
        self.inner.find_by_actor(campaign, actor).await
    }

    async fn count(&self, campaign: &str) -> AppResult<u64> {
        self.inner.count(campaign).await
    }

    async fn record_failure(&self, failed: &FailedGrant) -> AppResult<()> {
        self.inner.record_failure(failed).await
    }

    async fn unresolved_failures(
        &self,
        campaign: &str,
        limit: usize,
    ) -> AppResult<Vec<FailedGrant>> {
        self.inner.unresolved_failures(campaign, limit).await
    }

    async fn count_unresolved(&self, campaign: &str) -> AppResult<u64> {
        self.inner.count_unresolved(campaign).await
    }

    async fn mark_resolved(&self, failure_id: Uuid) -> AppResult<bool> {
        self.inner.mark_resolved(failure_id).await
    }

    async fn record_snapshot(&self, snapshot: &QuotaSnapshot) -> AppResult<()> {
        self.inner.record_snapshot(snapshot).await
    }

    async fn recent_snapshots(&self, campaign: &str, limit: usize) -> AppResult<Vec<QuotaSnapshot>> {
        self.inner.recent_snapshots(campaign, limit).await
    }

    async fn prune_snapshots(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.inner.prune_snapshots(before).await
    }

    async fn clear_campaign(&self, campaign: &str) -> AppResult<()> {
        self.inner.clear_campaign(campaign).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }
}

/// Store that never answers.
#[derive(Debug)]
struct StalledStore;

#[async_trait]
impl CoordinationStore for StalledStore {
    async fn insert_if_absent(&self, _key: &str, _member: &str) -> AppResult<bool> {
        std::future::pending().await
    }

    async fn remove_member(&self, _key: &str, _member: &str) -> AppResult<bool> {
        std::future::pending().await
    }

    async fn is_member(&self, _key: &str, _member: &str) -> AppResult<bool> {
        std::future::pending().await
    }

    async fn cardinality(&self, _key: &str) -> AppResult<u64> {
        std::future::pending().await
    }

    async fn increment_bounded(&self, _key: &str, _bound: u64) -> AppResult<Option<u64>> {
        std::future::pending().await
    }

    async fn decrement_floored(&self, _key: &str) -> AppResult<Option<u64>> {
        std::future::pending().await
    }

    async fn counter_value(&self, _key: &str) -> AppResult<u64> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        std::future::pending().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        std::future::pending().await
    }
}

/// Store that refuses every connection.
#[derive(Debug)]
struct UnreachableStore;

#[async_trait]
impl CoordinationStore for UnreachableStore {
    async fn insert_if_absent(&self, _key: &str, _member: &str) -> AppResult<bool> {
        Err(AppError::coordination("connection refused"))
    }

    async fn remove_member(&self, _key: &str, _member: &str) -> AppResult<bool> {
        Err(AppError::coordination("connection refused"))
    }

    async fn is_member(&self, _key: &str, _member: &str) -> AppResult<bool> {
        Err(AppError::coordination("connection refused"))
    }

    async fn cardinality(&self, _key: &str) -> AppResult<u64> {
        Err(AppError::coordination("connection refused"))
    }

    async fn increment_bounded(&self, _key: &str, _bound: u64) -> AppResult<Option<u64>> {
        Err(AppError::coordination("connection refused"))
    }

    async fn decrement_floored(&self, _key: &str) -> AppResult<Option<u64>> {
        Err(AppError::coordination("connection refused"))
    }

    async fn counter_value(&self, _key: &str) -> AppResult<u64> {
        Err(AppError::coordination("connection refused"))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::coordination("connection refused"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_ledger_failure_is_persistence_inconsistency() {
    let ledger = Arc::new(FlakyLedger::default());
    ledger.failing.store(true, Ordering::SeqCst);
    let engine = Arc::new(IssuanceEngine::new(
        Arc::new(MemoryStore::new()),
        ledger.clone(),
        "flaky",
        5,
        Duration::from_millis(500),
    ));
    let actor = ActorId::from(11u64);

    let result = engine.apply(&actor).await;

    let grant = match result {
        AllocationResult::Failed(AllocationFailure::PersistenceInconsistency { grant, .. }) => grant,
        other => panic!("expected persistence inconsistency, got {other:?}"),
    };
    assert_eq!(grant.actor_id, "11");
    assert_eq!(grant.slot, 1);

    // The slot stays reserved and the claim stays in place.
    let status = engine.status().await.unwrap();
    assert_eq!(status.issued, 1);
    assert_eq!(status.claimed, 1);
    assert!(matches!(
        engine.apply(&actor).await,
        AllocationResult::DeniedDuplicate
    ));

    // The decision was journaled.
    assert_eq!(ledger.count_unresolved("flaky").await.unwrap(), 1);
}

#[tokio::test]
async fn test_replay_recovers_journaled_grant() {
    let ledger = Arc::new(FlakyLedger::default());
    ledger.failing.store(true, Ordering::SeqCst);
    let engine = Arc::new(IssuanceEngine::new(
        Arc::new(MemoryStore::new()),
        ledger.clone(),
        "flaky",
        5,
        Duration::from_millis(500),
    ));
    let reconciler = GrantReconciler::new(engine.clone());
    let actor = ActorId::from(3u64);
    engine.apply(&actor).await;

    // While the ledger is down, journaled failures keep drift at zero.
    let snapshot = reconciler
        .reconcile(coupon_issuance::SnapshotSource::Manual)
        .await
        .unwrap();
    assert_eq!(snapshot.unresolved_failures, 1);
    assert_eq!(snapshot.drift, 0);

    ledger.failing.store(false, Ordering::SeqCst);
    let report = reconciler.replay_failed(None).await.unwrap();

    assert_eq!(report.replayed, 1);
    let stored = engine.grant_for(&actor).await.unwrap().unwrap();
    assert_eq!(stored.slot, 1);
    assert_eq!(ledger.count_unresolved("flaky").await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_store_times_out() {
    let engine = IssuanceEngine::new(
        Arc::new(StalledStore),
        Arc::new(MemoryGrantLedger::new()),
        "stalled",
        5,
        Duration::from_millis(200),
    );

    let result = engine.apply(&ActorId::from(1u64)).await;

    assert!(matches!(
        result,
        AllocationResult::Failed(AllocationFailure::CoordinationUnavailable { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_caller_deadline_is_honored() {
    let engine = IssuanceEngine::new(
        Arc::new(StalledStore),
        Arc::new(MemoryGrantLedger::new()),
        "stalled",
        5,
        Duration::from_secs(60),
    );

    let started = tokio::time::Instant::now();
    let result = engine
        .apply_with_deadline(&ActorId::from(1u64), Duration::from_millis(50))
        .await;

    assert!(matches!(result, AllocationResult::Failed(_)));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_unreachable_store_is_never_a_decision() {
    let ledger = Arc::new(MemoryGrantLedger::new());
    let engine = IssuanceEngine::new(
        Arc::new(UnreachableStore),
        ledger.clone(),
        "down",
        5,
        Duration::from_millis(200),
    );

    for id in 0..10u64 {
        let result = engine.apply(&ActorId::from(id)).await;
        match result {
            AllocationResult::Failed(AllocationFailure::CoordinationUnavailable { message }) => {
                assert!(message.contains("connection refused"));
            }
            other => panic!("expected coordination failure, got {other:?}"),
        }
    }
    assert_eq!(ledger.count("down").await.unwrap(), 0);
    assert!(engine.status().await.is_err());
}
