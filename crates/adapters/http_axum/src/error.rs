//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hcbridge_domain::error::{BridgeError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`BridgeError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(BridgeError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BridgeError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BridgeError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            BridgeError::NoResolver(_) => (StatusCode::NOT_IMPLEMENTED, self.0.to_string()),
            BridgeError::Hub(err) => {
                tracing::warn!(error = %err, "hub error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            BridgeError::Resolver(err) => {
                tracing::warn!(error = %err, "resolver error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            BridgeError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
