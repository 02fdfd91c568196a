//! Beacon entry point.
//!
//! Started with no arguments inside the container: loads `.env`, resolves the
//! configuration, initializes tracing, binds `PORT` and serves until SIGTERM.
//! `beacon probe` is the container's HEALTHCHECK command.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use beacon::config::{
    AppConfig, DEFAULT_BIND_ADDR, HEALTH_PATH, HEALTH_PROBE_INTERVAL_SECS, HEALTH_PROBE_RETRIES,
    HEALTH_PROBE_TIMEOUT_SECS,
};
use beacon::{http, logging, probe};

/// Beacon: binds PORT and answers container health probes
#[derive(Parser, Debug)]
#[command(name = "beacon", version, about)]
struct Args {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "beacon=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the local health endpoint; exit 0 if healthy, 1 otherwise
    Probe {
        /// Endpoint to probe instead of the one derived from PORT/HOST
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = HEALTH_PROBE_TIMEOUT_SECS)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > config
    let log_filter = logging::resolve_filter(
        args.log_level,
        std::env::var("RUST_LOG").ok(),
        &config.logging.level,
    );
    logging::init_tracing(&log_filter, config.logging.format)?;

    match args.command {
        Some(Command::Probe { url, timeout }) => {
            let url = url.unwrap_or_else(|| probe::probe_url(&config));
            if let Err(e) = probe::check(&url, Duration::from_secs(timeout)).await {
                tracing::error!(error = %e, "Health probe failed");
                std::process::exit(1);
            }
        }
        None => {
            let bind_addr = config.bind_addr()?;
            tracing::info!(
                bind = %bind_addr,
                default_bind = DEFAULT_BIND_ADDR,
                service = %config.service.name,
                log_format = %config.logging.format,
                "Loaded configuration"
            );
            tracing::debug!(
                path = HEALTH_PATH,
                interval_secs = HEALTH_PROBE_INTERVAL_SECS,
                timeout_secs = HEALTH_PROBE_TIMEOUT_SECS,
                retries = HEALTH_PROBE_RETRIES,
                "Expected health probe policy"
            );

            http::start_server(config).await?;
        }
    }

    Ok(())
}
