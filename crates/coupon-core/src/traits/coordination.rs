//! Coordination store trait for the atomic primitives the issuance engine needs.

use async_trait::async_trait;

use crate::result::AppResult;

/// Shared substrate providing atomic primitives across concurrent callers.
///
/// Every method is a single all-or-nothing operation at the store: a call
/// either takes full effect or none. Implementations report unreachable
/// or failing backends as [`ErrorKind::Coordination`](crate::error::ErrorKind::Coordination)
/// and must never cache values locally.
#[async_trait]
pub trait CoordinationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Add `member` to the set stored at `key`.
    ///
    /// Returns `true` if the member was inserted, `false` if it was
    /// already present. Check and insert happen as one operation.
    async fn insert_if_absent(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Remove `member` from the set at `key`. Returns `true` if it was present.
    async fn remove_member(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Check whether `member` is in the set at `key`.
    async fn is_member(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Number of members in the set at `key` (0 if absent).
    async fn cardinality(&self, key: &str) -> AppResult<u64>;

    /// Increment the counter at `key` by one if its value is below `bound`.
    ///
    /// Returns the new value, or `None` if the counter was already at or
    /// above `bound`, in which case it is left untouched.
    async fn increment_bounded(&self, key: &str, bound: u64) -> AppResult<Option<u64>>;

    /// Decrement the counter at `key` by one unless it is already zero.
    ///
    /// Returns the new value, or `None` if the counter was zero.
    async fn decrement_floored(&self, key: &str) -> AppResult<Option<u64>>;

    /// Current value of the counter at `key` (0 if absent).
    async fn counter_value(&self, key: &str) -> AppResult<u64>;

    /// Delete a key (set or counter). Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
