//! Quota snapshot repository implementation.

use sqlx::PgPool;

use coupon_core::error::{AppError, ErrorKind};
use coupon_core::result::AppResult;
use coupon_entity::quota::QuotaSnapshot;

/// Repository for reconciliation snapshots.
#[derive(Debug, Clone)]
pub struct QuotaSnapshotRepository {
    pool: PgPool,
}

impl QuotaSnapshotRepository {
    /// Create a new quota snapshot repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a snapshot.
    pub async fn create(&self, snapshot: &QuotaSnapshot) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO quota_snapshots \
             (id, campaign, capacity, issued, claimed, stored_grants, unresolved_failures, drift, source, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(snapshot.id)
        .bind(&snapshot.campaign)
        .bind(snapshot.capacity)
        .bind(snapshot.issued)
        .bind(snapshot.claimed)
        .bind(snapshot.stored_grants)
        .bind(snapshot.unresolved_failures)
        .bind(snapshot.drift)
        .bind(&snapshot.source)
        .bind(snapshot.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create snapshot", e))?;
        Ok(())
    }

    /// List the most recent snapshots of a campaign, newest first.
    pub async fn find_recent(&self, campaign: &str, limit: i64) -> AppResult<Vec<QuotaSnapshot>> {
        sqlx::query_as::<_, QuotaSnapshot>(
            "SELECT * FROM quota_snapshots WHERE campaign = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(campaign)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list snapshots", e))
    }

    /// Clean up snapshots older than `before`.
    pub async fn cleanup_old(&self, before: chrono::DateTime<chrono::Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM quota_snapshots WHERE created_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to cleanup snapshots", e)
            })?;
        Ok(result.rows_affected())
    }
}
