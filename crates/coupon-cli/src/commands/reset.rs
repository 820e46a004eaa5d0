//! Campaign reset.

use clap::Args;

use coupon_core::error::AppError;

use crate::output;

/// Arguments for the reset command
#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Also delete stored grants and failed grants
    #[arg(long)]
    pub purge: bool,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// Execute the reset command
pub async fn execute(args: &ResetArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    if !args.force {
        let prompt = if args.purge {
            format!(
                "This will clear the counter, claims, AND all stored grants of campaign '{}'. Continue?",
                config.issuance.campaign
            )
        } else {
            format!(
                "This will clear the counter and claims of campaign '{}'. Continue?",
                config.issuance.campaign
            )
        };
        let confirm = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let engine = super::build_engine(&config).await?;
    if args.purge {
        engine.purge().await?;
        output::print_success("Campaign reset and grants purged.");
    } else {
        engine.reset().await?;
        output::print_success("Campaign counter and claims reset.");
    }
    Ok(())
}
