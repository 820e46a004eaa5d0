//! Coupon issuance configuration.

use serde::{Deserialize, Serialize};

/// Settings for the admission-and-allocation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceConfig {
    /// Campaign name; namespaces the quota counter and claim set keys.
    #[serde(default = "default_campaign")]
    pub campaign: String,
    /// Maximum number of coupons ever granted (`N`).
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    /// Release an actor's claim when the quota turns out to be exhausted,
    /// letting that actor try again later. Claims are permanent when false.
    #[serde(default)]
    pub release_claim_on_exhausted: bool,
    /// Grant ledger backend: `"postgres"` or `"memory"`.
    #[serde(default = "default_persistence")]
    pub persistence: String,
    /// Cron expression for the periodic reconciliation job (6 fields, with seconds).
    #[serde(default = "default_reconcile_cron")]
    pub reconcile_cron: String,
    /// Whether the periodic reconciliation job is scheduled at all.
    #[serde(default = "default_true")]
    pub reconcile_enabled: bool,
    /// Days of reconciliation snapshots to keep.
    #[serde(default = "default_snapshot_retention_days")]
    pub snapshot_retention_days: u32,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            campaign: default_campaign(),
            capacity: default_capacity(),
            release_claim_on_exhausted: false,
            persistence: default_persistence(),
            reconcile_cron: default_reconcile_cron(),
            reconcile_enabled: true,
            snapshot_retention_days: default_snapshot_retention_days(),
        }
    }
}

fn default_campaign() -> String {
    "default".to_string()
}

fn default_capacity() -> u64 {
    100
}

fn default_persistence() -> String {
    "postgres".to_string()
}

fn default_reconcile_cron() -> String {
    "0 */5 * * * *".to_string()
}

fn default_snapshot_retention_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}
