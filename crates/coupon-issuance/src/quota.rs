//! Capacity-bounded quota counter.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use coupon_core::result::AppResult;
use coupon_core::traits::CoordinationStore;
use coupon_store::keys;

use crate::deadline::Deadline;

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reservation {
    /// The counter was below capacity and has been incremented.
    Reserved {
        /// New counter value, in `1..=capacity`.
        slot: u64,
    },
    /// The counter was already at capacity. Nothing changed.
    Exhausted,
}

impl Reservation {
    /// The reserved slot, if any.
    pub fn slot(&self) -> Option<u64> {
        match self {
            Self::Reserved { slot } => Some(*slot),
            Self::Exhausted => None,
        }
    }
}

/// Shared issued-slot counter that never exceeds the campaign capacity.
#[derive(Debug, Clone)]
pub struct QuotaCounter {
    /// Shared coordination store.
    store: Arc<dyn CoordinationStore>,
    /// Counter key for the campaign.
    key: String,
    /// Maximum number of slots (`N`).
    capacity: u64,
    /// Default deadline for one store round-trip.
    timeout: Duration,
}

impl QuotaCounter {
    /// Creates a counter over the campaign's issued-slot key.
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        campaign: &str,
        capacity: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            key: keys::issued_count(campaign),
            capacity,
            timeout,
        }
    }

    /// Reserves one slot if any remain.
    pub async fn try_reserve(&self) -> AppResult<Reservation> {
        self.try_reserve_within(Deadline::PerOperation(self.timeout))
            .await
    }

    /// Reserves one slot, abandoning the round-trip when `deadline` elapses.
    pub async fn try_reserve_within(&self, deadline: Deadline) -> AppResult<Reservation> {
        let reply = deadline
            .run(
                "try_reserve",
                self.store.increment_bounded(&self.key, self.capacity),
            )
            .await?;

        Ok(match reply {
            Some(slot) => Reservation::Reserved { slot },
            None => {
                debug!(capacity = self.capacity, "Quota exhausted");
                Reservation::Exhausted
            }
        })
    }

    /// Returns one slot to the pool. Never drops the counter below zero.
    ///
    /// Only used for operator compensation; the allocation path never
    /// gives slots back.
    pub async fn release(&self) -> AppResult<bool> {
        let reply = Deadline::PerOperation(self.timeout)
            .run("release_slot", self.store.decrement_floored(&self.key))
            .await?;
        Ok(reply.is_some())
    }

    /// Slots reserved so far.
    pub async fn issued(&self) -> AppResult<u64> {
        Deadline::PerOperation(self.timeout)
            .run("issued", self.store.counter_value(&self.key))
            .await
    }

    /// Slots still available.
    pub async fn remaining(&self) -> AppResult<u64> {
        Ok(self.capacity.saturating_sub(self.issued().await?))
    }

    /// Configured capacity.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Resets the counter to zero.
    pub async fn clear(&self) -> AppResult<()> {
        Deadline::PerOperation(self.timeout)
            .run("clear_counter", self.store.delete(&self.key))
            .await
    }
}
