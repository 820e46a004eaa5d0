//! CLI command definitions and dispatch.

pub mod failed;
pub mod migrate;
pub mod reconcile;
pub mod reset;
pub mod serve;
pub mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use coupon_core::config::AppConfig;
use coupon_core::error::AppError;
use coupon_issuance::{IssuanceEngine, ledger};
use coupon_store::StoreManager;

use crate::output::OutputFormat;

/// CouponHub: limited-quota coupon issuance
#[derive(Debug, Parser)]
#[command(name = "coupon-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the CouponHub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Show live quota status
    Status,
    /// Clear the campaign's counter and claims
    Reset(reset::ResetArgs),
    /// Drift detection
    Reconcile(reconcile::ReconcileArgs),
    /// Grants that were decided but not stored
    FailedGrants(failed::FailedArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Status => status::execute(&self.config, self.format).await,
            Commands::Reset(args) => reset::execute(args, &self.config).await,
            Commands::Reconcile(args) => reconcile::execute(args, &self.config, self.format).await,
            Commands::FailedGrants(args) => failed::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
}

/// Helper: build the engine against the configured store and ledger
pub async fn build_engine(config: &AppConfig) -> Result<Arc<IssuanceEngine>, AppError> {
    let store = StoreManager::new(&config.store).await?;
    let grant_ledger = ledger::connect(&config.issuance, &config.database).await?;
    Ok(Arc::new(IssuanceEngine::from_config(
        Arc::new(store),
        grant_ledger,
        config,
    )))
}
