//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error (validation, unknown area, bad date)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Upstream could not be reached
    #[error("Error communicating with weather API: {0}")]
    ExternalService(String),

    /// Upstream answered with an error; `status` is its HTTP status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Upstream has no data for the request
    #[error("No data available: {0}")]
    NoData(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Upstream payload could not be parsed
    #[error("Error parsing weather data: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the error means "nothing to show" rather than a failure
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            ApplicationError::NoData(_) | ApplicationError::Domain(DomainError::NotFound { .. })
        )
    }
}
