#![allow(dead_code)]

use std::time::Duration;

use beacon::http::{self, ServerError};
use beacon::routes::create_router;
use beacon::{AppConfig, AppState, Readiness};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Loopback config on an ephemeral port.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.http.host = "127.0.0.1".to_string();
    config.http.port = 0;
    config
}

/// Spawns the router behind a readiness flag the test controls.
pub async fn spawn_router(readiness: Readiness) -> String {
    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    let state = AppState::new(test_config(), readiness);
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// A running server started through the real bind/serve path.
pub struct RunningServer {
    pub address: String,
    pub port: u16,
    pub readiness: Readiness,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl RunningServer {
    /// Trigger graceful shutdown and wait for the server task to finish.
    pub async fn stop(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("Server did not stop within 5 seconds")
            .expect("Server task panicked")
    }
}

/// Binds `config` and serves it until [`RunningServer::stop`].
///
/// Returns once the server reports ready.
pub async fn spawn_server(config: AppConfig) -> RunningServer {
    let server = http::bind(config).await.expect("Failed to bind server");
    let port = server.local_addr().unwrap().port();
    let readiness = server.readiness();

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(async {
        rx.await.ok();
    }));

    wait_until_ready(&readiness).await;

    RunningServer {
        address: format!("http://127.0.0.1:{}", port),
        port,
        readiness,
        shutdown: Some(tx),
        handle,
    }
}

pub async fn wait_until_ready(readiness: &Readiness) {
    for _ in 0..500 {
        if readiness.is_ready() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Server did not become ready within 5 seconds");
}

/// A port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
