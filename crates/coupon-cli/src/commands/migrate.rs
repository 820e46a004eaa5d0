//! Grant schema commands.

use clap::{Args, Subcommand};

use coupon_core::error::AppError;
use coupon_database::{GrantDatabase, schema_version};

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Create or upgrade the grant tables
    Run,
    /// Check whether the grant tables exist
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if config.issuance.persistence != "postgres" {
        output::print_warning(&format!(
            "issuance.persistence is '{}'; grants are not stored in PostgreSQL.",
            config.issuance.persistence
        ));
    }

    let db = GrantDatabase::open(&config.database).await?;
    let result = match &args.command {
        MigrateCommand::Run => db.migrate().await.map(|version| {
            output::print_success(&format!("Grant schema at version {version}."));
        }),
        MigrateCommand::Check => db.probe().await.map(|present| {
            output::print_kv("Embedded version", &schema_version().to_string());
            if present {
                output::print_success("Grant tables present.");
            } else {
                output::print_warning("Grant tables missing; run `coupon-cli migrate run`.");
            }
        }),
    };

    db.close().await;
    result
}
