//! Live quota status.

use coupon_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Execute the status command
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let engine = super::build_engine(&config).await?;

    let status = engine.status().await?;
    let stored = engine.ledger().count(engine.campaign()).await?;

    match format {
        OutputFormat::Json => output::print_json(&status),
        OutputFormat::Table => {
            println!("Campaign '{}'", status.campaign);
            output::print_kv("Capacity", &status.capacity.to_string());
            output::print_kv("Issued", &status.issued.to_string());
            output::print_kv("Remaining", &status.remaining.to_string());
            output::print_kv("Claimed actors", &status.claimed.to_string());
            output::print_kv("Stored grants", &stored.to_string());
            if status.is_exhausted() {
                output::print_warning("Quota exhausted.");
            }
        }
    }
    Ok(())
}
