//! Allocation engine.
//!
//! Composes the dedup gate, the quota counter, and the grant ledger:
//!
//! 1. Claim the actor. A repeat claim is denied as a duplicate and never
//!    touches the counter.
//! 2. Reserve a slot. An exhausted counter denies the request.
//! 3. Record the grant.
//!
//! Each step is atomic on its own. The composition is not: a failure
//! between steps leaves an earlier step applied, which the reconciler
//! reports later. No in-process lock is held across steps and nothing
//! is retried here.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use coupon_core::config::AppConfig;
use coupon_core::error::AppError;
use coupon_core::result::AppResult;
use coupon_core::traits::CoordinationStore;
use coupon_core::types::ActorId;
use coupon_entity::grant::{FailedGrant, Grant};
use coupon_entity::quota::QuotaStatus;

use crate::deadline::Deadline;
use crate::gate::DedupGate;
use crate::ledger::GrantLedger;
use crate::quota::{QuotaCounter, Reservation};

/// Outcome of one `apply` call.
#[derive(Debug, Clone)]
pub enum AllocationResult {
    /// A coupon was issued and stored.
    Granted(Grant),
    /// The actor had already applied.
    DeniedDuplicate,
    /// Every slot was taken.
    DeniedQuotaExhausted,
    /// The request could not be decided or its decision could not be stored.
    Failed(AllocationFailure),
}

impl AllocationResult {
    /// The issued grant, if any.
    pub fn grant(&self) -> Option<&Grant> {
        match self {
            Self::Granted(grant) => Some(grant),
            _ => None,
        }
    }

    /// Whether a coupon was issued.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Why an allocation failed.
#[derive(Debug, Clone, Error)]
pub enum AllocationFailure {
    /// The coordination store was unreachable or missed its deadline.
    ///
    /// Nothing was decided for this step. The caller may retry.
    #[error("coordination store unavailable: {message}")]
    CoordinationUnavailable {
        /// Underlying store error.
        message: String,
    },
    /// A slot was reserved and the actor claimed, but the grant was not stored.
    #[error("grant {} for actor {} was decided but not stored: {message}", .grant.id, .grant.actor_id)]
    PersistenceInconsistency {
        /// The grant that was decided.
        grant: Grant,
        /// Underlying ledger error.
        message: String,
    },
}

impl From<AppError> for AllocationFailure {
    fn from(err: AppError) -> Self {
        Self::CoordinationUnavailable {
            message: err.message,
        }
    }
}

/// The admission-and-allocation engine for one campaign.
#[derive(Debug, Clone)]
pub struct IssuanceEngine {
    /// Campaign name.
    campaign: String,
    /// Per-actor dedup gate.
    gate: DedupGate,
    /// Bounded slot counter.
    quota: QuotaCounter,
    /// Durable grant storage.
    ledger: Arc<dyn GrantLedger>,
    /// Give the claim back when the quota is exhausted.
    release_claim_on_exhausted: bool,
    /// Default deadline for each store round-trip.
    operation_timeout: Duration,
}

impl IssuanceEngine {
    /// Creates an engine for `campaign` with capacity `capacity`.
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        ledger: Arc<dyn GrantLedger>,
        campaign: impl Into<String>,
        capacity: u64,
        operation_timeout: Duration,
    ) -> Self {
        let campaign = campaign.into();
        Self {
            gate: DedupGate::new(store.clone(), &campaign, operation_timeout),
            quota: QuotaCounter::new(store, &campaign, capacity, operation_timeout),
            campaign,
            ledger,
            release_claim_on_exhausted: false,
            operation_timeout,
        }
    }

    /// Creates an engine from the `issuance` and `store` configuration sections.
    pub fn from_config(
        store: Arc<dyn CoordinationStore>,
        ledger: Arc<dyn GrantLedger>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            store,
            ledger,
            config.issuance.campaign.clone(),
            config.issuance.capacity,
            Duration::from_millis(config.store.operation_timeout_ms),
        )
        .with_release_claim_on_exhausted(config.issuance.release_claim_on_exhausted)
    }

    /// Release the actor's claim when the quota turns out to be exhausted,
    /// so the actor may apply again if slots are returned later.
    pub fn with_release_claim_on_exhausted(mut self, release: bool) -> Self {
        self.release_claim_on_exhausted = release;
        self
    }

    /// Decides whether `actor` gets a coupon.
    ///
    /// Each store round-trip is bounded by the configured operation timeout.
    pub async fn apply(&self, actor: &ActorId) -> AllocationResult {
        self.decide(actor, Deadline::PerOperation(self.operation_timeout))
            .await
    }

    /// Decides whether `actor` gets a coupon, with every store round-trip
    /// finishing within `budget` of this call.
    pub async fn apply_with_deadline(&self, actor: &ActorId, budget: Duration) -> AllocationResult {
        self.decide(actor, Deadline::after(budget)).await
    }

    async fn decide(&self, actor: &ActorId, deadline: Deadline) -> AllocationResult {
        match self.gate.try_claim_within(actor, deadline).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(campaign = %self.campaign, actor_id = %actor, "Denied duplicate application");
                return AllocationResult::DeniedDuplicate;
            }
            Err(e) => return self.unavailable(actor, e),
        }

        let slot = match self.quota.try_reserve_within(deadline).await {
            Ok(Reservation::Reserved { slot }) => slot,
            Ok(Reservation::Exhausted) => {
                debug!(campaign = %self.campaign, actor_id = %actor, "Denied, quota exhausted");
                if self.release_claim_on_exhausted {
                    if let Err(e) = self.gate.release_within(actor, deadline).await {
                        warn!(
                            campaign = %self.campaign,
                            actor_id = %actor,
                            error = %e,
                            "Failed to release claim after exhaustion"
                        );
                    }
                }
                return AllocationResult::DeniedQuotaExhausted;
            }
            Err(e) => return self.unavailable(actor, e),
        };

        let decided = Grant::issue(&self.campaign, actor, slot);
        match self.ledger.record(&decided).await {
            Ok(existing) if existing.id != decided.id => {
                // The actor already holds a stored grant from before a reset.
                warn!(
                    campaign = %self.campaign,
                    actor_id = %actor,
                    slot,
                    grant_id = %existing.id,
                    "Actor already holds a stored grant, returning reserved slot"
                );
                if let Err(e) = self.quota.release().await {
                    warn!(
                        campaign = %self.campaign,
                        actor_id = %actor,
                        slot,
                        error = %e,
                        "Failed to return reserved slot"
                    );
                }
                AllocationResult::DeniedDuplicate
            }
            Ok(grant) => {
                info!(
                    campaign = %self.campaign,
                    actor_id = %actor,
                    slot,
                    grant_id = %grant.id,
                    "Coupon granted"
                );
                AllocationResult::Granted(grant)
            }
            Err(e) => {
                error!(
                    campaign = %self.campaign,
                    actor_id = %actor,
                    slot,
                    error = %e,
                    "Grant decided but not stored"
                );
                self.journal_failure(&decided, &e).await;
                AllocationResult::Failed(AllocationFailure::PersistenceInconsistency {
                    grant: decided,
                    message: e.message,
                })
            }
        }
    }

    fn unavailable(&self, actor: &ActorId, err: AppError) -> AllocationResult {
        warn!(
            campaign = %self.campaign,
            actor_id = %actor,
            error = %err,
            "Coordination store unavailable"
        );
        AllocationResult::Failed(err.into())
    }

    async fn journal_failure(&self, grant: &Grant, cause: &AppError) {
        let failed = FailedGrant::from_grant(grant, cause.to_string());
        if let Err(e) = self.ledger.record_failure(&failed).await {
            error!(
                grant_id = %grant.id,
                actor_id = %grant.actor_id,
                slot = grant.slot,
                error = %e,
                "Failed to journal failed grant"
            );
        }
    }

    /// Live quota status read from the coordination store.
    pub async fn status(&self) -> AppResult<QuotaStatus> {
        let issued = self.quota.issued().await?;
        let claimed = self.gate.claimed_count().await?;
        Ok(QuotaStatus::new(
            self.campaign.clone(),
            self.quota.capacity(),
            issued,
            claimed,
        ))
    }

    /// The stored grant for `actor`, if any.
    pub async fn grant_for(&self, actor: &ActorId) -> AppResult<Option<Grant>> {
        self.ledger.find_by_actor(&self.campaign, actor).await
    }

    /// Clears the campaign's counter and claim set.
    ///
    /// Stored grants are left alone; use [`IssuanceEngine::purge`] to drop
    /// those too.
    pub async fn reset(&self) -> AppResult<()> {
        self.quota.clear().await?;
        self.gate.clear().await?;
        warn!(campaign = %self.campaign, "Campaign coordination state reset");
        Ok(())
    }

    /// Clears coordination state and every stored grant for the campaign.
    pub async fn purge(&self) -> AppResult<()> {
        self.reset().await?;
        self.ledger.clear_campaign(&self.campaign).await?;
        warn!(campaign = %self.campaign, "Campaign grants purged");
        Ok(())
    }

    /// Returns one slot to the counter, for operator compensation of a
    /// leaked reservation.
    pub async fn release_slot(&self) -> AppResult<bool> {
        self.quota.release().await
    }

    /// Campaign name.
    pub fn campaign(&self) -> &str {
        &self.campaign
    }

    /// Configured capacity.
    pub fn capacity(&self) -> u64 {
        self.quota.capacity()
    }

    /// The grant ledger.
    pub fn ledger(&self) -> &Arc<dyn GrantLedger> {
        &self.ledger
    }
}
