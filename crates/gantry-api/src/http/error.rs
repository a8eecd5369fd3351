//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use gantry_core::orchestrator::OrchestratorError;
use gantry_types::error::{EventError, SnapshotError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The webhook could not be turned into a valid event.
    InvalidEvent(EventError),
    /// The repository snapshot could not be produced.
    Snapshot(SnapshotError),
    /// Generic internal error.
    Internal(String),
}

impl From<EventError> for AppError {
    fn from(e: EventError) -> Self {
        AppError::InvalidEvent(e)
    }
}

impl From<OrchestratorError> for AppError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::InvalidEvent(e) => AppError::InvalidEvent(e),
            OrchestratorError::Snapshot(e) => AppError::Snapshot(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidEvent(_) | AppError::Snapshot(SnapshotError::UnsafeArgument(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Snapshot(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidEvent(EventError::MissingEventType) => "MISSING_EVENT_TYPE",
            AppError::InvalidEvent(_) => "INVALID_EVENT",
            AppError::Snapshot(SnapshotError::Timeout(_)) => "SNAPSHOT_TIMEOUT",
            AppError::Snapshot(SnapshotError::UnsafeArgument(_)) => "UNSAFE_GIT_ARGUMENT",
            AppError::Snapshot(_) => "SNAPSHOT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::InvalidEvent(e) => e.to_string(),
            AppError::Snapshot(e) => e.to_string(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self.message(), "webhook request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self.message(), "webhook request rejected");
        }
        let body = ApiResponse::error(self.code(), &self.message(), Uuid::now_v7().to_string(), 0);
        (status, Json(body)).into_response()
    }
}
