//! Quota status and reconciliation snapshot entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coupon_core::types::SnapshotId;

/// Live status of a campaign's quota, read from the coordination store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Campaign name.
    pub campaign: String,
    /// Configured capacity `N`.
    pub capacity: u64,
    /// Slots reserved so far (counter value).
    pub issued: u64,
    /// Slots still available.
    pub remaining: u64,
    /// Actors that have passed the dedup gate.
    pub claimed: u64,
}

impl QuotaStatus {
    /// Build a status, deriving `remaining` from capacity and issued.
    pub fn new(campaign: impl Into<String>, capacity: u64, issued: u64, claimed: u64) -> Self {
        Self {
            campaign: campaign.into(),
            capacity,
            issued,
            remaining: capacity.saturating_sub(issued),
            claimed,
        }
    }

    /// Whether every slot has been reserved.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// A historical record of one reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuotaSnapshot {
    /// Snapshot ID.
    pub id: SnapshotId,
    /// Campaign name.
    pub campaign: String,
    /// Configured capacity.
    pub capacity: i64,
    /// Counter value in the coordination store.
    pub issued: i64,
    /// Claim set cardinality.
    pub claimed: i64,
    /// Grants durably stored in the ledger.
    pub stored_grants: i64,
    /// Failed grant writes not yet replayed.
    pub unresolved_failures: i64,
    /// `issued - stored_grants - unresolved_failures`; non-zero means leaked reservations.
    pub drift: i64,
    /// Source of the snapshot (e.g., "reconciler", "manual", "startup").
    pub source: String,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
}

impl QuotaSnapshot {
    /// Whether this pass found reservations unaccounted for.
    pub fn drift_detected(&self) -> bool {
        self.drift != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_saturates() {
        let status = QuotaStatus::new("launch", 10, 10, 14);
        assert_eq!(status.remaining, 0);
        assert!(status.is_exhausted());
    }
}
