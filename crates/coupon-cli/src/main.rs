//! CouponHub admin CLI.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use coupon_core::error::ErrorKind;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::from(exit_status(e.kind))
        }
    }
}

/// `RUST_LOG` wins; otherwise each `-v` lowers the threshold one step from `warn`.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// 2 for bad input or configuration, 3 when a retry may succeed, 1 otherwise.
fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Configuration | ErrorKind::Validation => 2,
        kind if kind.is_retryable() => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_by_kind() {
        assert_eq!(exit_status(ErrorKind::Configuration), 2);
        assert_eq!(exit_status(ErrorKind::Coordination), 3);
        assert_eq!(exit_status(ErrorKind::Database), 3);
        assert_eq!(exit_status(ErrorKind::NotFound), 1);
    }
}
