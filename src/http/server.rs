//! HTTP server startup logic.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::{AppConfig, ConfigError};
use crate::readiness::Readiness;
use crate::routes::create_router;
use crate::state::AppState;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Port unavailable: failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Invalid listen address: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),
}

/// A listener that owns its port but is not yet serving.
///
/// The readiness flag stays `Starting` until [`BoundServer::serve`] runs.
pub struct BoundServer {
    listener: TcpListener,
    state: AppState,
}

/// Bind the configured address.
///
/// A port already held by another listener is fatal: the caller exits
/// non-zero and the container runtime takes care of restarts.
pub async fn bind(config: AppConfig) -> Result<BoundServer, ServerError> {
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let state = AppState::new(config, Readiness::new());
    tracing::debug!(%addr, "Bound listener");

    Ok(BoundServer { listener, state })
}

impl BoundServer {
    /// Address actually bound (differs from the configured one for port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle on the readiness flag this server will flip.
    pub fn readiness(&self) -> Readiness {
        self.state.readiness.clone()
    }

    /// Serve until SIGTERM or Ctrl+C.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.serve_with_shutdown(shutdown::shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr().map_err(ServerError::Serve)?;
        let app = create_router(self.state.clone());

        self.state.readiness.mark_ready();
        tracing::info!(
            %addr,
            service = %self.state.config.service.name,
            "Service ready"
        );

        axum::serve(self.listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Bind and serve based on configuration.
///
/// This function blocks until the server shuts down.
pub async fn start_server(config: AppConfig) -> Result<(), ServerError> {
    let server = bind(config).await?;
    server.serve().await
}
