//! Per-actor dedup gate.
//!
//! Admits each actor into the allocation path at most once per campaign.
//! Check-and-insert is delegated to the coordination store so concurrent
//! claims for the same actor race at the store, not in this process.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use coupon_core::result::AppResult;
use coupon_core::traits::CoordinationStore;
use coupon_core::types::ActorId;
use coupon_store::keys;

use crate::deadline::Deadline;

/// Records which actors have attempted allocation.
#[derive(Debug, Clone)]
pub struct DedupGate {
    /// Shared coordination store.
    store: Arc<dyn CoordinationStore>,
    /// Claim set key for the campaign.
    key: String,
    /// Default deadline for one store round-trip.
    timeout: Duration,
}

impl DedupGate {
    /// Creates a gate over the campaign's claim set.
    pub fn new(store: Arc<dyn CoordinationStore>, campaign: &str, timeout: Duration) -> Self {
        Self {
            store,
            key: keys::claimed_actors(campaign),
            timeout,
        }
    }

    /// Claims the actor.
    ///
    /// Returns `true` only for the first successful claim. Once recorded,
    /// the claim stays in place whatever the quota outcome.
    pub async fn try_claim(&self, actor: &ActorId) -> AppResult<bool> {
        self.try_claim_within(actor, Deadline::PerOperation(self.timeout))
            .await
    }

    /// Claims the actor, abandoning the round-trip when `deadline` elapses.
    pub async fn try_claim_within(&self, actor: &ActorId, deadline: Deadline) -> AppResult<bool> {
        let inserted = deadline
            .run(
                "try_claim",
                self.store.insert_if_absent(&self.key, actor.as_str()),
            )
            .await?;

        if !inserted {
            debug!(actor_id = %actor, "Actor already claimed");
        }
        Ok(inserted)
    }

    /// Removes the actor's claim so a later request may try again.
    pub async fn release(&self, actor: &ActorId) -> AppResult<bool> {
        self.release_within(actor, Deadline::PerOperation(self.timeout))
            .await
    }

    /// Removes the actor's claim under an explicit deadline.
    pub async fn release_within(&self, actor: &ActorId, deadline: Deadline) -> AppResult<bool> {
        deadline
            .run("release_claim", self.store.remove_member(&self.key, actor.as_str()))
            .await
    }

    /// Whether the actor has already claimed.
    pub async fn is_claimed(&self, actor: &ActorId) -> AppResult<bool> {
        Deadline::PerOperation(self.timeout)
            .run("is_claimed", self.store.is_member(&self.key, actor.as_str()))
            .await
    }

    /// Number of actors that have claimed.
    pub async fn claimed_count(&self) -> AppResult<u64> {
        Deadline::PerOperation(self.timeout)
            .run("claimed_count", self.store.cardinality(&self.key))
            .await
    }

    /// Drops every claim for the campaign.
    pub async fn clear(&self) -> AppResult<()> {
        Deadline::PerOperation(self.timeout)
            .run("clear_claims", self.store.delete(&self.key))
            .await
    }
}
