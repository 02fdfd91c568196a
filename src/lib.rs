//! Beacon: a minimal container service.
//!
//! Binds a configurable TCP port (`PORT`, default 10000) and answers liveness
//! probes at `/health`. The container runtime polls that endpoint and owns the
//! restart policy; this crate only has to bind, report ready, and answer.
//!
//! ## Modules
//!
//! - [`config`] - constants and `AppConfig` (defaults, TOML file, environment)
//! - [`http`] - bind, serve, graceful shutdown
//! - [`routes`] - router and the health handler
//! - [`readiness`] - the `Starting -> Ready` flag read by the health handler
//! - [`probe`] - client side of the health check, used by `beacon probe`

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod probe;
pub mod readiness;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use readiness::{Readiness, ServiceState};
pub use state::AppState;
