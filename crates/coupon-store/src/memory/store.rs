//! In-memory coordination store using dashmap and atomic counters.
//!
//! Suitable for single-node deployments and tests. Claims are sharded
//! `DashSet` inserts; the bounded increment is a compare-and-swap loop, so
//! unrelated callers never wait on a common lock.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::one::Ref;
use dashmap::{DashMap, DashSet};
use tracing::debug;

use coupon_core::result::AppResult;
use coupon_core::traits::CoordinationStore;

/// In-memory coordination store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Named sets of members.
    sets: DashMap<String, DashSet<String>>,
    /// Named counters.
    counters: DashMap<String, AtomicU64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the set at `key`, creating it if missing.
    fn set(&self, key: &str) -> Ref<'_, String, DashSet<String>> {
        if let Some(set) = self.sets.get(key) {
            return set;
        }
        self.sets.entry(key.to_string()).or_default().downgrade()
    }

    /// Shared handle to the counter at `key`, creating it if missing.
    fn counter(&self, key: &str) -> Ref<'_, String, AtomicU64> {
        if let Some(counter) = self.counters.get(key) {
            return counter;
        }
        self.counters
            .entry(key.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .downgrade()
    }
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn insert_if_absent(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self.set(key).insert(member.to_string()))
    }

    async fn remove_member(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self
            .sets
            .get(key)
            .map(|set| set.remove(member).is_some())
            .unwrap_or(false))
    }

    async fn is_member(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self
            .sets
            .get(key)
            .map(|set| set.contains(member))
            .unwrap_or(false))
    }

    async fn cardinality(&self, key: &str) -> AppResult<u64> {
        Ok(self.sets.get(key).map(|set| set.len() as u64).unwrap_or(0))
    }

    async fn increment_bounded(&self, key: &str, bound: u64) -> AppResult<Option<u64>> {
        let counter = self.counter(key);
        let mut current = counter.load(Ordering::Acquire);
        loop {
            if current >= bound {
                return Ok(None);
            }
            match counter.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(Some(current + 1)),
                Err(actual) => current = actual,
            }
        }
    }

    async fn decrement_floored(&self, key: &str) -> AppResult<Option<u64>> {
        let Some(counter) = self.counters.get(key) else {
            return Ok(None);
        };
        let mut current = counter.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return Ok(None);
            }
            match counter.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(Some(current - 1)),
                Err(actual) => current = actual,
            }
        }
    }

    async fn counter_value(&self, key: &str) -> AppResult<u64> {
        Ok(self
            .counters
            .get(key)
            .map(|counter| counter.load(Ordering::Acquire))
            .unwrap_or(0))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let removed_set = self.sets.remove(key).is_some();
        let removed_counter = self.counters.remove(key).is_some();
        debug!(key, removed_set, removed_counter, "Deleted key");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
