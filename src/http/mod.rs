//! HTTP server module.
//!
//! Binding and serving are separate steps so a bind failure surfaces before
//! the service ever reports ready:
//! - [`bind`] claims the configured port exclusively, or fails with
//!   [`ServerError::Bind`]
//! - [`BoundServer::serve`] marks the service ready and runs the accept loop
//!   until SIGTERM/SIGINT, then drains in-flight requests

mod server;
mod shutdown;

pub use server::{bind, start_server, BoundServer, ServerError};
pub use shutdown::shutdown_signal;
