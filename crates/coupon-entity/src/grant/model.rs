//! Issued grant entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coupon_core::types::{ActorId, GrantId};

/// The durable record of one successful allocation.
///
/// Immutable once created. At most one grant exists per actor and campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Grant {
    /// Grant ID.
    pub id: GrantId,
    /// Campaign the coupon belongs to.
    pub campaign: String,
    /// Canonical actor identity.
    pub actor_id: String,
    /// Quota slot reserved for this grant (1..=capacity).
    pub slot: i64,
    /// When the allocation was decided.
    pub issued_at: DateTime<Utc>,
}

impl Grant {
    /// Build a grant for an actor that has claimed and reserved `slot`.
    pub fn issue(campaign: &str, actor: &ActorId, slot: u64) -> Self {
        Self {
            id: GrantId::new(),
            campaign: campaign.to_string(),
            actor_id: actor.as_str().to_string(),
            slot: i64::try_from(slot).unwrap_or(i64::MAX),
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_carries_actor_and_slot() {
        let grant = Grant::issue("launch", &ActorId::from(9u64), 3);
        assert_eq!(grant.campaign, "launch");
        assert_eq!(grant.actor_id, "9");
        assert_eq!(grant.slot, 3);
    }

    #[test]
    fn test_grant_ids_are_unique() {
        let actor = ActorId::from(1u64);
        let a = Grant::issue("launch", &actor, 1);
        let b = Grant::issue("launch", &actor, 1);
        assert_ne!(a.id, b.id);
    }
}
