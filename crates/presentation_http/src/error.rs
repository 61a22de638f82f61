//! API error handling
//!
//! Maps application errors onto HTTP statuses and a JSON body of
//! `{ error, code, details? }`. In production, internal details are dropped.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global flag to control error detail exposure
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

/// Configure whether internal error details are included in responses.
///
/// Set to `false` in production.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

const GENERIC_MESSAGE: &str = "An error occurred processing your request";

/// Drop messages that look like they carry URLs, paths or socket details
fn sanitize_error_message(msg: &str, expose: bool) -> String {
    if expose {
        return msg.to_string();
    }

    let lower = msg.to_lowercase();
    let sensitive = ["://", "/home/", "/var/", "/etc/", ".rs:", "connection refused", "os error"];
    if sensitive.iter().any(|pattern| lower.contains(pattern)) {
        return GENERIC_MESSAGE.to_string();
    }
    msg.to_string()
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    /// The weather API answered with an error status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The weather API could not be reached
    #[error("Error communicating with weather API: {0}")]
    ServiceUnavailable(String),

    /// The weather API answered with something we could not read
    #[error("Error parsing weather data: {0}")]
    UpstreamParse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Upstream statuses that are not errors become 502
    fn upstream_status(status: u16) -> StatusCode {
        StatusCode::from_u16(status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY)
    }

    /// Status and body, with or without internal details
    fn parts(&self, expose: bool) -> (StatusCode, ErrorResponse) {
        let details = |msg: &String| expose.then(|| msg.clone());

        let (status, code, error, details) = match self {
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                sanitize_error_message(msg, expose),
                None,
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "not_found",
                sanitize_error_message(msg, expose),
                None,
            ),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Rate limit exceeded".to_string(),
                None,
            ),
            Self::Upstream { status, message } => (
                Self::upstream_status(*status),
                "upstream_error",
                sanitize_error_message(message, expose),
                None,
            ),
            Self::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "Error communicating with weather API".to_string(),
                details(msg),
            ),
            Self::UpstreamParse(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "parse_error",
                "Error parsing weather data".to_string(),
                details(msg),
            ),
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
                details(msg),
            ),
        };

        (
            status,
            ErrorResponse {
                error,
                code: code.to_string(),
                details,
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts(should_expose_details());
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "Request failed");
        }
        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e @ DomainError::NotFound { .. }) => {
                Self::NotFound(e.to_string())
            },
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::ExternalService(msg) => Self::ServiceUnavailable(msg),
            ApplicationError::Upstream { status, message } => Self::Upstream { status, message },
            ApplicationError::NoData(msg) => Self::NotFound(msg),
            ApplicationError::RateLimited => Self::RateLimited,
            ApplicationError::Parse(msg) => Self::UpstreamParse(msg),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApplicationError::from(err).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
