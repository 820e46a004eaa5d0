//! Journal entry for grants that were decided but could not be stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use coupon_core::types::GrantId;

use super::model::Grant;

/// A grant whose slot was reserved but whose durable write failed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FailedGrant {
    /// Journal entry ID.
    pub id: Uuid,
    /// ID of the grant that was decided.
    pub grant_id: GrantId,
    /// Campaign.
    pub campaign: String,
    /// Actor identity.
    pub actor_id: String,
    /// Reserved slot.
    pub slot: i64,
    /// When the grant was decided.
    pub issued_at: DateTime<Utc>,
    /// Why the write failed.
    pub reason: String,
    /// When the failure was journaled.
    pub failed_at: DateTime<Utc>,
    /// Set once the grant has been replayed into the ledger.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl FailedGrant {
    /// Journal a failed write for `grant`.
    pub fn from_grant(grant: &Grant, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            grant_id: grant.id,
            campaign: grant.campaign.clone(),
            actor_id: grant.actor_id.clone(),
            slot: grant.slot,
            issued_at: grant.issued_at,
            reason: reason.into(),
            failed_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Rebuild the grant exactly as it was decided.
    pub fn to_grant(&self) -> Grant {
        Grant {
            id: self.grant_id,
            campaign: self.campaign.clone(),
            actor_id: self.actor_id.clone(),
            slot: self.slot,
            issued_at: self.issued_at,
        }
    }

    /// Whether the grant has been replayed.
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}
