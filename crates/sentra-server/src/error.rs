//! HTTP mapping of domain errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sentra_core::error::SentraError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wrapper turning [`SentraError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub SentraError);

impl From<SentraError> for ApiError {
    fn from(err: SentraError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SentraError::NotFound { .. } => StatusCode::NOT_FOUND,
            SentraError::AlreadyExists { .. } => StatusCode::CONFLICT,
            SentraError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            SentraError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
            SentraError::Configuration(_)
            | SentraError::Database(_)
            | SentraError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
