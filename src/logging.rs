//! Tracing subscriber setup.
//!
//! Filter priority: `--log-level` flag, then `RUST_LOG`, then the configured
//! base level (`LOG_LEVEL`). The configured level is combined with
//! [`QUIET_LOG_TARGETS`] so HTTP plumbing stays at warn.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, QUIET_LOG_TARGETS};

pub use tracing_subscriber::util::TryInitError;

/// Pick the filter directive string by priority: CLI > RUST_LOG > config.
pub fn resolve_filter(
    cli: Option<String>,
    rust_log: Option<String>,
    configured_level: &str,
) -> String {
    cli.filter(|s| !s.trim().is_empty())
        .or_else(|| rust_log.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| format!("{},{}", configured_level, QUIET_LOG_TARGETS))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(filter: &str, format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter));

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}
