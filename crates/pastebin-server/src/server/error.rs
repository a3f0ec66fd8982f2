//! API error type and plain-text response formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use pastebin::{LookupError, StoreError};

/// API error type that converts to HTTP responses.
///
/// The response body is only the canonical status text; `code` and
/// `message` go to the log.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Identifier that does not match the store's key pattern.
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_IDENTIFIER", message)
    }

    /// Well-formed identifier with nothing stored under it.
    pub fn paste_not_found(key: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "PASTE_NOT_FOUND",
            format!("No paste stored under '{}'", key),
        )
    }

    /// Backend failure.
    pub fn store_failure(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "server error response"
            );
        } else if self.status.is_client_error() {
            debug!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "client error response"
            );
        }

        let body = self.status.canonical_reason().unwrap_or("Error");
        (self.status, body).into_response()
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidIdentifier(e) => Self::invalid_identifier(e.to_string()),
            LookupError::NotFound(key) => Self::paste_not_found(key.as_str()),
            LookupError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::store_failure(err.to_string())
    }
}
