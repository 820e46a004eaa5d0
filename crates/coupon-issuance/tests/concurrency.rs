//! Allocation guarantees under concurrent load, run against the
//! in-memory coordination store and ledger.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use coupon_core::types::ActorId;
use coupon_issuance::{AllocationResult, IssuanceEngine, MemoryGrantLedger};
use coupon_store::memory::MemoryStore;

const CAMPAIGN: &str = "load";

fn engine(capacity: u64) -> Arc<IssuanceEngine> {
    Arc::new(IssuanceEngine::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryGrantLedger::new()),
        CAMPAIGN,
        capacity,
        Duration::from_secs(5),
    ))
}

async fn apply_concurrently(
    engine: &Arc<IssuanceEngine>,
    actors: Vec<ActorId>,
) -> Vec<AllocationResult> {
    let tasks = actors.into_iter().map(|actor| {
        let engine = Arc::clone(engine);
        tokio::spawn(async move { engine.apply(&actor).await })
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect()
}

#[derive(Debug, Default)]
struct Tally {
    granted: usize,
    duplicate: usize,
    exhausted: usize,
    failed: usize,
}

fn tally(results: &[AllocationResult]) -> Tally {
    let mut t = Tally::default();
    for result in results {
        match result {
            AllocationResult::Granted(_) => t.granted += 1,
            AllocationResult::DeniedDuplicate => t.duplicate += 1,
            AllocationResult::DeniedQuotaExhausted => t.exhausted += 1,
            AllocationResult::Failed(_) => t.failed += 1,
        }
    }
    t
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_distinct_actors_fill_quota_exactly() {
    let engine = engine(100);
    let actors = (1..=1000u64).map(ActorId::from).collect();

    let results = apply_concurrently(&engine, actors).await;
    let t = tally(&results);

    assert_eq!(t.granted, 100);
    assert_eq!(t.exhausted, 900);
    assert_eq!(t.duplicate, 0);
    assert_eq!(t.failed, 0);

    let status = engine.status().await.unwrap();
    assert_eq!(status.issued, 100);
    assert_eq!(status.remaining, 0);
    assert_eq!(engine.ledger().count(CAMPAIGN).await.unwrap(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_granted_slots_are_distinct_and_in_range() {
    let engine = engine(50);
    let actors = (1..=400u64).map(ActorId::from).collect();

    let results = apply_concurrently(&engine, actors).await;

    let slots: HashSet<i64> = results
        .iter()
        .filter_map(AllocationResult::grant)
        .map(|g| g.slot)
        .collect();
    assert_eq!(slots.len(), 50);
    assert!(slots.iter().all(|slot| (1..=50).contains(slot)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_single_actor_storm_grants_once() {
    let engine = engine(100);
    let actor = ActorId::from(7u64);
    let actors = std::iter::repeat_n(actor.clone(), 1000).collect();

    let results = apply_concurrently(&engine, actors).await;
    let t = tally(&results);

    assert_eq!(t.granted, 1);
    assert_eq!(t.duplicate, 999);
    assert_eq!(engine.status().await.unwrap().issued, 1);
    assert!(engine.grant_for(&actor).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_repeating_actors_under_scarce_quota() {
    let engine = engine(10);
    // 100 actors, each applying 5 times.
    let actors = (0..500u64).map(|i| ActorId::from(i % 100)).collect();

    let results = apply_concurrently(&engine, actors).await;
    let t = tally(&results);

    assert_eq!(t.granted, 10);
    assert_eq!(t.duplicate, 400);
    assert_eq!(t.exhausted, 90);

    let holders: HashSet<String> = results
        .iter()
        .filter_map(AllocationResult::grant)
        .map(|g| g.actor_id.clone())
        .collect();
    assert_eq!(holders.len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_exhaustion_is_exact() {
    let engine = engine(64);
    let actors = (1..=64u64).map(ActorId::from).collect();

    let results = apply_concurrently(&engine, actors).await;
    let t = tally(&results);

    assert_eq!(t.granted, 64);
    assert_eq!(t.exhausted, 0);
    assert_eq!(engine.status().await.unwrap().remaining, 0);

    assert!(matches!(
        engine.apply(&ActorId::from(65u64)).await,
        AllocationResult::DeniedQuotaExhausted
    ));
    assert_eq!(engine.status().await.unwrap().issued, 64);
}

#[tokio::test]
async fn test_reapply_after_grant_is_duplicate() {
    let engine = engine(3);
    let actor = ActorId::parse("alice").unwrap();

    let first = engine.apply(&actor).await;
    let grant = first.grant().cloned().unwrap();

    for _ in 0..3 {
        assert!(matches!(
            engine.apply(&actor).await,
            AllocationResult::DeniedDuplicate
        ));
    }
    assert_eq!(engine.grant_for(&actor).await.unwrap(), Some(grant));
    assert_eq!(engine.status().await.unwrap().issued, 1);
}
