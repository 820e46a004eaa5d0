//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coupon_entity::grant::Grant;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// An issued coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantResponse {
    /// Grant ID.
    pub grant_id: String,
    /// Campaign.
    pub campaign: String,
    /// Holder.
    pub actor_id: String,
    /// Reserved quota slot.
    pub slot: i64,
    /// When it was issued.
    pub issued_at: DateTime<Utc>,
}

impl From<Grant> for GrantResponse {
    fn from(grant: Grant) -> Self {
        Self {
            grant_id: grant.id.to_string(),
            campaign: grant.campaign,
            actor_id: grant.actor_id,
            slot: grant.slot,
            issued_at: grant.issued_at,
        }
    }
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Health check with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Active coordination store provider.
    pub store_provider: String,
    /// Coordination store status.
    pub store: String,
    /// Grant ledger status.
    pub ledger: String,
    /// Campaign being served.
    pub campaign: String,
}
