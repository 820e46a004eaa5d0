//! Reconciliation commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use coupon_core::error::AppError;
use coupon_entity::quota::QuotaSnapshot;
use coupon_issuance::{GrantReconciler, SnapshotSource};

use crate::output::{self, OutputFormat};

/// Arguments for reconcile commands
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Reconcile subcommand
    #[command(subcommand)]
    pub command: ReconcileCommand,
}

/// Reconcile subcommands
#[derive(Debug, Subcommand)]
pub enum ReconcileCommand {
    /// Run one reconciliation pass now
    Run,
    /// Show recent snapshots
    History {
        /// Number of snapshots
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Delete snapshots older than the retention window
    Prune {
        /// Days to keep (defaults to the configured retention)
        #[arg(long)]
        days: Option<u32>,
    },
}

/// Snapshot display row
#[derive(Debug, Serialize, Tabled)]
struct SnapshotRow {
    /// Taken at
    taken_at: String,
    /// Source
    source: String,
    /// Issued
    issued: i64,
    /// Stored
    stored: i64,
    /// Unresolved
    unresolved: i64,
    /// Drift
    drift: i64,
}

impl From<&QuotaSnapshot> for SnapshotRow {
    fn from(s: &QuotaSnapshot) -> Self {
        Self {
            taken_at: s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            source: s.source.clone(),
            issued: s.issued,
            stored: s.stored_grants,
            unresolved: s.unresolved_failures,
            drift: s.drift,
        }
    }
}

/// Execute reconcile commands
pub async fn execute(
    args: &ReconcileArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let reconciler = GrantReconciler::new(super::build_engine(&config).await?);

    match &args.command {
        ReconcileCommand::Run => {
            let snapshot = reconciler.reconcile(SnapshotSource::Manual).await?;
            output::print_list(&[SnapshotRow::from(&snapshot)], format);
            if snapshot.drift_detected() {
                output::print_warning(&format!(
                    "Drift of {} slot(s) between counter and stored grants.",
                    snapshot.drift
                ));
            } else {
                output::print_success("Counter matches stored grants.");
            }
        }
        ReconcileCommand::History { limit } => {
            let history = reconciler.history(*limit).await?;
            let rows: Vec<SnapshotRow> = history.iter().map(SnapshotRow::from).collect();
            output::print_list(&rows, format);
        }
        ReconcileCommand::Prune { days } => {
            let days = days.unwrap_or(config.issuance.snapshot_retention_days);
            let removed = reconciler.prune_history(days).await?;
            output::print_success(&format!("Removed {removed} snapshot(s) older than {days} day(s)."));
        }
    }
    Ok(())
}
