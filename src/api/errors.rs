use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::validation::ValidationIssue;
use crate::core::config::Environment;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    BadRequest(String),
    Validation(Vec<ValidationIssue>),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    /// Like [`ApiError::internal`], but development builds expose the raw error and
    /// everything else gets `public_message`.
    pub(crate) fn unexpected(
        err: &anyhow::Error,
        environment: Environment,
        public_message: &str,
    ) -> Self {
        tracing::error!(error = %format!("{err:#}"), "{public_message}");
        if environment.is_development() {
            Self::Internal(format!("{err:#}"))
        } else {
            Self::Internal(public_message.to_string())
        }
    }
}

fn error_body(status: StatusCode, detail: String, issues: Vec<ValidationIssue>) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), detail, issues })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response =
                    error_body(StatusCode::UNAUTHORIZED, message.to_string(), Vec::new());
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::BadRequest(message) => {
                error_body(StatusCode::BAD_REQUEST, message, Vec::new())
            }
            ApiError::Validation(issues) => {
                tracing::debug!(issues = issues.len(), "Request failed validation");
                error_body(StatusCode::BAD_REQUEST, "Validation failed".to_string(), issues)
            }
            ApiError::NotFound(message) => error_body(StatusCode::NOT_FOUND, message, Vec::new()),
            ApiError::Conflict(message) => error_body(StatusCode::CONFLICT, message, Vec::new()),
            ApiError::PayloadTooLarge(message) => {
                error_body(StatusCode::PAYLOAD_TOO_LARGE, message, Vec::new())
            }
            ApiError::ServiceUnavailable(message) => {
                tracing::warn!(error = %message, "Service unavailable");
                error_body(StatusCode::SERVICE_UNAVAILABLE, message, Vec::new())
            }
            ApiError::Internal(message) => {
                error_body(StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new())
            }
        }
    }
}
