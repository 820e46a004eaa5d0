//! Durable grant ledger.
//!
//! The engine hands every decided grant to a [`GrantLedger`]. Recording
//! is idempotent per (campaign, actor) so replaying a grant after a
//! partial failure never creates a second row.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use coupon_core::config::{DatabaseConfig, IssuanceConfig};
use coupon_core::error::AppError;
use coupon_core::result::AppResult;
use coupon_core::types::ActorId;
use coupon_entity::grant::{FailedGrant, Grant};
use coupon_entity::quota::QuotaSnapshot;

pub use memory::MemoryGrantLedger;
pub use postgres::PgGrantLedger;

/// Storage for grants, failed grant writes, and reconciliation snapshots.
#[async_trait]
pub trait GrantLedger: Send + Sync + std::fmt::Debug + 'static {
    /// Store `grant` unless the actor already has one.
    ///
    /// Returns the stored grant, which is the existing row when the actor
    /// was already recorded.
    async fn record(&self, grant: &Grant) -> AppResult<Grant>;

    /// Look up the grant issued to an actor.
    async fn find_by_actor(&self, campaign: &str, actor: &ActorId) -> AppResult<Option<Grant>>;

    /// Number of stored grants for a campaign.
    async fn count(&self, campaign: &str) -> AppResult<u64>;

    /// Journal a grant that was decided but could not be stored.
    async fn record_failure(&self, failed: &FailedGrant) -> AppResult<()>;

    /// Oldest unresolved failed grants first.
    async fn unresolved_failures(&self, campaign: &str, limit: usize)
    -> AppResult<Vec<FailedGrant>>;

    /// Number of unresolved failed grants.
    async fn count_unresolved(&self, campaign: &str) -> AppResult<u64>;

    /// Mark a failed grant as replayed. Returns `false` if it was unknown or already resolved.
    async fn mark_resolved(&self, failure_id: Uuid) -> AppResult<bool>;

    /// Persist a reconciliation snapshot.
    async fn record_snapshot(&self, snapshot: &QuotaSnapshot) -> AppResult<()>;

    /// Most recent snapshots first.
    async fn recent_snapshots(&self, campaign: &str, limit: usize) -> AppResult<Vec<QuotaSnapshot>>;

    /// Delete snapshots created before `before`. Returns the number removed.
    async fn prune_snapshots(&self, before: DateTime<Utc>) -> AppResult<u64>;

    /// Delete every grant and failed grant for a campaign.
    async fn clear_campaign(&self, campaign: &str) -> AppResult<()>;

    /// Check that the backing storage is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Build the ledger selected by `issuance.persistence`.
///
/// The PostgreSQL ledger connects and runs pending migrations before it
/// is returned.
pub async fn connect(
    issuance: &IssuanceConfig,
    database: &DatabaseConfig,
) -> AppResult<Arc<dyn GrantLedger>> {
    match issuance.persistence.as_str() {
        "postgres" => {
            info!("Initializing PostgreSQL grant ledger");
            let db = coupon_database::GrantDatabase::open(database).await?;
            db.migrate().await?;
            Ok(Arc::new(PgGrantLedger::new(db)))
        }
        "memory" => {
            info!("Initializing in-memory grant ledger");
            Ok(Arc::new(MemoryGrantLedger::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown grant persistence: '{other}'. Supported: postgres, memory"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupon_core::error::ErrorKind;

    #[tokio::test]
    async fn test_unknown_persistence_rejected() {
        let issuance = IssuanceConfig {
            persistence: "cassandra".to_string(),
            ..IssuanceConfig::default()
        };
        let err = connect(&issuance, &DatabaseConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_memory_persistence() {
        let issuance = IssuanceConfig {
            persistence: "memory".to_string(),
            ..IssuanceConfig::default()
        };
        let ledger = connect(&issuance, &DatabaseConfig::default()).await.unwrap();
        assert!(ledger.health_check().await.unwrap());
    }
}
