#![cfg(not(tarpaulin_include))]

use clap::Parser;
use domain_dashboard::{app, config::Config};
use tracing_subscriber::EnvFilter;

/// Main entry point for the dashboard web application
///
/// Parses the command line (with environment fallbacks), sets up logging
/// and runs the web server until it is stopped.
///
/// # Logging
/// * `RUST_LOG` takes precedence; otherwise `--verbose` selects debug output
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    app::run(config).await
}
