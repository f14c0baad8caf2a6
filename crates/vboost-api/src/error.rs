//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use vboost_metadata::MetadataError;
use vboost_models::ErrorResponse;
use vboost_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingInput(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Video processing failed")]
    ProcessingFailed { message: String, details: Value },

    #[error("Failed to store processed video")]
    StorageWriteFailed(#[source] StorageError),

    #[error("Failed to save video metadata")]
    MetadataWriteFailed(#[source] MetadataError),

    #[error("Failed to fetch video")]
    MetadataReadFailed(#[source] MetadataError),

    #[error("Video not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingInput(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::ProcessingFailed { .. }
            | ApiError::StorageWriteFailed(_)
            | ApiError::MetadataWriteFailed(_)
            | ApiError::MetadataReadFailed(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Backend detail for the response body; `None` in production except
    /// for the processor's own diagnostics.
    fn details(&self, production: bool) -> Option<Value> {
        let internal = match self {
            ApiError::ProcessingFailed { details, .. } => return Some(details.clone()),
            ApiError::StorageWriteFailed(e) => e.to_string(),
            ApiError::MetadataWriteFailed(e) | ApiError::MetadataReadFailed(e) => e.to_string(),
            ApiError::Internal(msg) => msg.clone(),
            ApiError::MissingInput(_) | ApiError::PayloadTooLarge(_) | ApiError::NotFound => {
                return None
            }
        };

        (!production).then_some(Value::String(internal))
    }

    fn body(&self, production: bool) -> ErrorResponse {
        let body = ErrorResponse::new(self.to_string());
        match self.details(production) {
            Some(details) => body.with_details(details),
            None => body,
        }
    }

    fn log(&self) {
        match self {
            ApiError::ProcessingFailed { message, details } => {
                error!(error = %message, details = %details, "Video processing failed");
            }
            ApiError::StorageWriteFailed(e) => error!(error = %e, "Object store write failed"),
            ApiError::MetadataWriteFailed(e) => error!(error = %e, "Metadata insert failed"),
            ApiError::MetadataReadFailed(e) => error!(error = %e, "Metadata lookup failed"),
            ApiError::Internal(msg) => error!(error = %msg, "Internal error"),
            ApiError::MissingInput(_) | ApiError::PayloadTooLarge(_) | ApiError::NotFound => {
                warn!(error = %self, "Request rejected")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let body = self.body(false);
        let redacted = self.body(true);

        let redacted = (redacted != body).then_some(RedactedError(redacted));

        let mut response = (self.status_code(), Json(body)).into_response();
        if let Some(redacted) = redacted {
            response.extensions_mut().insert(redacted);
        }
        response
    }
}

/// Production variant of an error body, swapped in by
/// [`crate::middleware::redact_error_details`].
#[derive(Debug, Clone)]
pub struct RedactedError(pub ErrorResponse);
