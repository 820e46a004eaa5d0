//! Failed grant journal repository implementation.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use coupon_core::error::{AppError, ErrorKind};
use coupon_core::result::AppResult;
use coupon_entity::grant::FailedGrant;

/// Repository for grants whose durable write failed.
#[derive(Debug, Clone)]
pub struct FailedGrantRepository {
    pool: PgPool,
}

impl FailedGrantRepository {
    /// Create a new failed grant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Journal a failed grant write.
    pub async fn create(&self, failed: &FailedGrant) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO failed_grants \
             (id, grant_id, campaign, actor_id, slot, issued_at, reason, failed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(failed.id)
        .bind(failed.grant_id)
        .bind(&failed.campaign)
        .bind(&failed.actor_id)
        .bind(failed.slot)
        .bind(failed.issued_at)
        .bind(&failed.reason)
        .bind(failed.failed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to journal failed grant", e)
        })?;
        Ok(())
    }

    /// List unresolved entries for a campaign, oldest first.
    pub async fn find_unresolved(&self, campaign: &str, limit: i64) -> AppResult<Vec<FailedGrant>> {
        sqlx::query_as::<_, FailedGrant>(
            "SELECT * FROM failed_grants WHERE campaign = $1 AND resolved_at IS NULL \
             ORDER BY failed_at ASC LIMIT $2",
        )
        .bind(campaign)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list failed grants", e)
        })
    }

    /// Count unresolved entries for a campaign.
    pub async fn count_unresolved(&self, campaign: &str) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM failed_grants WHERE campaign = $1 AND resolved_at IS NULL",
        )
        .bind(campaign)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count failed grants", e)
        })?;
        Ok(total.max(0) as u64)
    }

    /// Mark an entry as replayed.
    pub async fn mark_resolved(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE failed_grants SET resolved_at = $2 WHERE id = $1 AND resolved_at IS NULL",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve failed grant", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every entry of a campaign.
    pub async fn delete_campaign(&self, campaign: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM failed_grants WHERE campaign = $1")
            .bind(campaign)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete failed grants", e)
            })?;
        Ok(result.rows_affected())
    }
}
