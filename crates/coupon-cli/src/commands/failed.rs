//! Failed grant commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use coupon_core::error::AppError;
use coupon_issuance::GrantReconciler;

use crate::output::{self, OutputFormat};

/// Arguments for failed grant commands
#[derive(Debug, Args)]
pub struct FailedArgs {
    /// Failed grant subcommand
    #[command(subcommand)]
    pub command: FailedCommand,
}

/// Failed grant subcommands
#[derive(Debug, Subcommand)]
pub enum FailedCommand {
    /// List unresolved failed grants
    List {
        /// Maximum entries
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Store unresolved failed grants again
    Replay {
        /// Maximum entries to replay
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Failed grant display row
#[derive(Debug, Serialize, Tabled)]
struct FailedRow {
    /// Journal ID
    id: String,
    /// Actor
    actor: String,
    /// Slot
    slot: i64,
    /// Failed at
    failed_at: String,
    /// Reason
    reason: String,
}

/// Execute failed grant commands
pub async fn execute(
    args: &FailedArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let engine = super::build_engine(&config).await?;

    match &args.command {
        FailedCommand::List { limit } => {
            let failures = engine
                .ledger()
                .unresolved_failures(engine.campaign(), *limit)
                .await?;
            let rows: Vec<FailedRow> = failures
                .iter()
                .map(|f| FailedRow {
                    id: f.id.to_string(),
                    actor: f.actor_id.clone(),
                    slot: f.slot,
                    failed_at: f.failed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    reason: f.reason.clone(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        FailedCommand::Replay { limit } => {
            let report = GrantReconciler::new(engine).replay_failed(*limit).await?;
            match format {
                OutputFormat::Json => output::print_json(&report),
                OutputFormat::Table => {
                    output::print_kv("Replayed", &report.replayed.to_string());
                    output::print_kv("Still failing", &report.still_failing.to_string());
                    if report.still_failing > 0 {
                        output::print_warning("Some grants could not be stored.");
                    } else {
                        output::print_success("All failed grants resolved.");
                    }
                }
            }
        }
    }
    Ok(())
}
