//! Configuration loading and constants.
//!
//! The service reads its configuration once at startup. Values are layered:
//! built-in defaults, then an optional TOML file, then environment variables.
//! `AppConfig` is the resolved, immutable result that gets handed to the
//! listener and the request handlers.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

use const_format::formatcp;
use serde::Deserialize;

// =============================================================================
// Network Defaults
// =============================================================================

/// Port bound when `PORT` is not set
pub const DEFAULT_PORT: u16 = 10000;

/// Bind address when `HOST` is not set (all interfaces, as a container expects)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen address, shown in CLI help
pub const DEFAULT_BIND_ADDR: &str = formatcp!("{}:{}", DEFAULT_HOST, DEFAULT_PORT);

// =============================================================================
// Health Probe Policy
// =============================================================================
// These mirror the HEALTHCHECK policy in the Dockerfile. The container runtime
// owns the retry/restart decision; the process only has to answer in time.

/// Path answered by the liveness probe
pub const HEALTH_PATH: &str = "/health";

/// Seconds between probes issued by the container runtime
pub const HEALTH_PROBE_INTERVAL_SECS: u64 = 30;

/// Seconds a single probe may take before it counts as failed
pub const HEALTH_PROBE_TIMEOUT_SECS: u64 = 10;

/// Consecutive failed probes before the container is marked unhealthy
pub const HEALTH_PROBE_RETRIES: u32 = 3;

/// Cache-Control for health responses
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

/// User-Agent sent by the built-in probe
pub const PROBE_USER_AGENT: &str = formatcp!(
    "{}-probe/{}",
    DEFAULT_SERVICE_NAME,
    env!("CARGO_PKG_VERSION")
);

// =============================================================================
// Environment Variables
// =============================================================================

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_SERVICE_NAME: &str = "SERVICE_NAME";

// =============================================================================
// Default Strings
// =============================================================================

/// Service name reported in the health body
pub const DEFAULT_SERVICE_NAME: &str = "beacon";

/// Default base log level when neither RUST_LOG nor LOG_LEVEL is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Crates whose chatter is kept out of the base log level
pub const QUIET_LOG_TARGETS: &str = "hyper=warn,hyper_util=warn,reqwest=warn";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Identity reported by the health endpoint
    #[serde(default)]
    pub service: ServiceConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "ServiceConfig::default_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
        }
    }
}

impl ServiceConfig {
    fn default_name() -> String {
        DEFAULT_SERVICE_NAME.to_string()
    }
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Base level ("info", "debug", ...). RUST_LOG wins when set.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        DEFAULT_LOG_LEVEL.to_string()
    }
}

impl AppConfig {
    /// Resolve the configuration from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(process_env)?;
        Ok(config)
    }

    /// Parse a TOML configuration file. Missing sections fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from environment variables, looked up through `lookup`.
    ///
    /// A variable that is set but malformed is an error, never a fallback to
    /// the default.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_PORT) {
            self.http.port = parse_port(&raw)?;
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.http.host = host.trim().to_string();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_ascii_lowercase();
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format.parse()?;
        }
        if let Some(name) = lookup(ENV_SERVICE_NAME) {
            self.service.name = name.trim().to_string();
        }
        self.validate()
    }

    /// Socket address the listener binds.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .http
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.http.host.clone()))?;
        Ok(SocketAddr::new(ip, self.http.port))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.service.name.is_empty() {
            return Err(ConfigError::Validation(
                "service.name must not be empty".to_string(),
            ));
        }
        if self.logging.level.is_empty() {
            return Err(ConfigError::Validation(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a `PORT` value. Port 0 is rejected: nothing could probe it.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let invalid = |reason: &'static str| ConfigError::InvalidPort {
        value: raw.to_string(),
        reason,
    };

    let port: u16 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected an integer between 1 and 65535"))?;
    if port == 0 {
        return Err(invalid("port 0 cannot be targeted by a health probe"));
    }
    Ok(port)
}

fn process_env(key: &str) -> Option<String> {
    // Non-UTF-8 values are kept (lossily) so they fail validation instead of
    // reading as unset.
    std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid PORT value {value:?}: {reason}")]
    InvalidPort { value: String, reason: &'static str },
    #[error("Invalid bind host {0:?}: expected an IP address")]
    InvalidHost(String),
    #[error("Invalid log format {0:?}: expected \"text\" or \"json\"")]
    InvalidLogFormat(String),
    #[error("Configuration error: {0}")]
    Validation(String),
}
