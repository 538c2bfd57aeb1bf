//! HTTP error responses.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::sorter::SortError;

/// Errors surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body is not JSON or not `{"to_sort": [[int, ...], ...]}`.
    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    /// Body could not be read (too large, connection error).
    #[error("{message}")]
    BodyRejected { status: StatusCode, message: String },

    #[error("Server is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Sort(#[from] SortError),

    /// Serializing a finished result failed. The detail is logged only.
    #[error("Internal server error")]
    Encoding(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::BodyRejected { status, .. } => *status,
            Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            Self::Sort(e) => match e {
                SortError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                SortError::QueueFull { .. } | SortError::PoolShutdown => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                SortError::WorkerPanicked { .. }
                | SortError::WorkersLost { .. }
                | SortError::SlotConflict { .. }
                | SortError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "invalid_payload",
            Self::BodyRejected { .. } => "body_rejected",
            Self::ShuttingDown => "shutting_down",
            Self::Sort(e) => e.kind(),
            Self::Encoding(_) => "encoding_failure",
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::BodyRejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Encoding(detail) = &self {
            tracing::error!(%detail, "failed to encode response");
        }

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": self.kind(),
            }
        }));

        (status, body).into_response()
    }
}
