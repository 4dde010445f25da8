//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::Error;

/// Error returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request rejected with a fixed message.
    #[error("{0}")]
    BadRequest(String),

    /// Failure inside the harvester.
    #[error(transparent)]
    Harvest(#[from] Error),

    /// Unexpected server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Harvest(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Harvest(Error::NoBoard) => StatusCode::BAD_REQUEST,
            Self::Harvest(Error::CaptureTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Harvest(Error::PoolDraining) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Harvest(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
