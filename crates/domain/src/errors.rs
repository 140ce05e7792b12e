//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Coordinate outside the valid latitude/longitude range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<crate::value_objects::InvalidCoordinates> for DomainError {
    fn from(err: crate::value_objects::InvalidCoordinates) -> Self {
        Self::InvalidCoordinate(err.to_string())
    }
}
