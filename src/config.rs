use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::ingest::{CsvSource, DEFAULT_SOURCE_URL, FileSource, HttpSource, IngestError};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dashboard",
    about = "Serve a login-gated dashboard over a published spreadsheet CSV export",
    version,
    long_about = None
)]
pub struct Config {
    /// Address to listen on
    #[arg(short, long, env = "DASHBOARD_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// CSV export to fetch the records from
    #[arg(long, env = "DASHBOARD_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Read the records from a local CSV file instead of the URL
    #[arg(long, env = "DASHBOARD_SOURCE_FILE")]
    pub source_file: Option<PathBuf>,

    /// Timeout for the CSV request, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Build the configured record source; a local file wins over the URL
    pub fn source(&self) -> Result<Arc<dyn CsvSource>, IngestError> {
        match &self.source_file {
            Some(path) => Ok(Arc::new(FileSource::new(path.clone()))),
            None => Ok(Arc::new(HttpSource::new(
                self.source_url.clone(),
                Duration::from_secs(self.timeout_secs),
            )?)),
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "domain_dashboard=debug,tower_http=debug"
        } else {
            "domain_dashboard=info,tower_http=info"
        }
    }
}
