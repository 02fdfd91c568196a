//! Health check endpoint for container orchestration.
//!
//! The container runtime polls `/health` every 30 seconds with a 10 second
//! timeout and restarts the container after three consecutive failures. This
//! handler does no I/O, so it answers well within that budget; before the
//! server is ready it answers 503 so a probe never sees success early.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::readiness::ServiceState;
use crate::state::AppState;

/// Body of a successful health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    pub started_at: String,
    pub uptime_seconds: u64,
}

/// Health check handler.
///
/// Liveness only: success means the process has finished starting and can
/// answer HTTP. Reading the readiness flag has no side effects, so repeated
/// probes are idempotent.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    match state.readiness.state() {
        ServiceState::Starting => Err(AppError::NotReady),
        ServiceState::Ready => Ok(Json(HealthResponse {
            status: "ok",
            service: state.config.service.name.clone(),
            version: env!("CARGO_PKG_VERSION"),
            started_at: state.started_at.to_rfc3339(),
            uptime_seconds: state.uptime().as_secs(),
        })),
    }
}
