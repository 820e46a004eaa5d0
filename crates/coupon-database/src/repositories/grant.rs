//! Grant repository implementation.

use sqlx::PgPool;

use coupon_core::error::{AppError, ErrorKind};
use coupon_core::result::AppResult;
use coupon_entity::grant::Grant;

/// Repository for issued grants.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    pool: PgPool,
}

impl GrantRepository {
    /// Create a new grant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a grant, keyed by (campaign, actor).
    ///
    /// Idempotent: if the actor already holds a grant in the campaign the
    /// existing row is returned and nothing is written.
    pub async fn insert_idempotent(&self, grant: &Grant) -> AppResult<Grant> {
        let inserted = sqlx::query_as::<_, Grant>(
            "INSERT INTO grants (id, campaign, actor_id, slot, issued_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT DO NOTHING RETURNING *",
        )
        .bind(grant.id)
        .bind(&grant.campaign)
        .bind(&grant.actor_id)
        .bind(grant.slot)
        .bind(grant.issued_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert grant", e))?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        self.find_by_actor(&grant.campaign, &grant.actor_id)
            .await?
            .ok_or_else(|| {
                AppError::conflict(format!(
                    "Grant {} of campaign '{}' collides with an existing row",
                    grant.id, grant.campaign
                ))
            })
    }

    /// Find the grant held by an actor in a campaign.
    pub async fn find_by_actor(&self, campaign: &str, actor_id: &str) -> AppResult<Option<Grant>> {
        sqlx::query_as::<_, Grant>("SELECT * FROM grants WHERE campaign = $1 AND actor_id = $2")
            .bind(campaign)
            .bind(actor_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find grant", e))
    }

    /// Count grants stored for a campaign.
    pub async fn count(&self, campaign: &str) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grants WHERE campaign = $1")
            .bind(campaign)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count grants", e))?;
        Ok(total.max(0) as u64)
    }

    /// Delete every grant of a campaign. Returns the number of rows removed.
    pub async fn delete_campaign(&self, campaign: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM grants WHERE campaign = $1")
            .bind(campaign)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete grants", e))?;
        Ok(result.rows_affected())
    }
}
