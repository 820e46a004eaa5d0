//! Key builders for all CouponHub coordination store entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all coupon keys.
const PREFIX: &str = "coupon";

/// Set of actor identities that have passed the dedup gate for a campaign.
pub fn claimed_actors(campaign: &str) -> String {
    format!("{PREFIX}:{campaign}:applied")
}

/// Counter of reserved quota slots for a campaign.
pub fn issued_count(campaign: &str) -> String {
    format!("{PREFIX}:{campaign}:count")
}
