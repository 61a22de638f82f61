//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Coordinates outside the valid latitude/longitude ranges
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Unknown station metric name
    #[error("Unknown station metric: {0}")]
    UnknownMetric(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Date/time parsing error
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("Area", "Bedok");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Area");
                assert_eq!(id, "Bedok");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("Station", "S109");
        assert_eq!(err.to_string(), "Station not found: S109");
    }

    #[test]
    fn unknown_metric_error_message() {
        let err = DomainError::UnknownMetric("pressure".to_string());
        assert_eq!(err.to_string(), "Unknown station metric: pressure");
    }

    #[test]
    fn invalid_datetime_error_message() {
        let err = DomainError::InvalidDateTime("2024-13-01".to_string());
        assert_eq!(err.to_string(), "Invalid date/time: 2024-13-01");
    }

    #[test]
    fn invalid_coordinates_mentions_ranges() {
        let msg = DomainError::InvalidCoordinates.to_string();
        assert!(msg.contains("latitude"));
        assert!(msg.contains("longitude"));
    }
}
