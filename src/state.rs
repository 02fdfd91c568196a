//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::readiness::Readiness;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the resolved configuration, the readiness flag written by the server,
/// and the startup time reported by the health endpoint.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub readiness: Readiness,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl AppState {
    /// Creates a new application state from the given configuration and readiness flag.
    pub fn new(config: AppConfig, readiness: Readiness) -> Self {
        Self {
            config: Arc::new(config),
            readiness,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Time since the state was created.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}
