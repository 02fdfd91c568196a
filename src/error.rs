use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Service is starting")]
    NotReady,

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, label) = match &self {
            AppError::NotReady => {
                tracing::debug!("Health probe answered before readiness");
                (StatusCode::SERVICE_UNAVAILABLE, "starting")
            }
            AppError::NotFound(path) => {
                tracing::debug!(%path, "No route for path");
                (StatusCode::NOT_FOUND, "error")
            }
        };

        let body = Json(ErrorBody {
            status: label,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
