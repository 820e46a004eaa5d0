//! Start the CouponHub server.

use clap::Args;

use coupon_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the campaign capacity
    #[arg(long)]
    pub capacity: Option<u64>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(capacity) = args.capacity {
        config.issuance.capacity = capacity;
    }
    config.validate()?;

    println!("Starting CouponHub server...");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Campaign: {}", config.issuance.campaign);
    println!("  Capacity: {}", config.issuance.capacity);

    coupon_api::run_server(config).await
}
