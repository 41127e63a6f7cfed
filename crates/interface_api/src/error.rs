//! API error handling

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use core_kernel::{ErrorKind, WorkflowError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// A lifecycle operation failed
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The request could not be decoded
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn from_workflow(err: &WorkflowError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// HTTP status for a workflow error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState | ErrorKind::PricingRequired => StatusCode::CONFLICT,
        ErrorKind::RatingUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Transport => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Workflow(err) => {
                let status = status_for(err.kind());
                if status.is_server_error() {
                    error!(kind = %err.kind(), entity = err.entity(), "Request failed: {}", err);
                } else {
                    warn!(kind = %err.kind(), entity = err.entity(), "Request rejected: {}", err);
                }
                (status, ErrorResponse::from_workflow(err))
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "bad_request".to_string(),
                    message: msg.clone(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
