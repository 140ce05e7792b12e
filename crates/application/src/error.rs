//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Permission, discovery and search failures are absorbed by the session
/// controller and only show up as state. Route failures are returned to the
/// caller because a route is always an explicit user request.
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Location permission refused
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform cannot provide positions
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// Fuel station query failed (network, timeout or parse)
    #[error("Station discovery failed: {0}")]
    DiscoveryFailed(String),

    /// Place search failed
    #[error("Place search failed: {0}")]
    SearchFailed(String),

    /// Routing service answered but knows no route between the points
    #[error("No route available: {0}")]
    RouteUnavailable(String),

    /// Routing request could not be completed
    #[error("Route request failed: {0}")]
    RouteFetchFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DiscoveryFailed(_) | Self::SearchFailed(_) | Self::RouteFetchFailed(_)
        )
    }

    /// Whether the end user should see this error
    pub const fn is_user_visible(&self) -> bool {
        matches!(self, Self::RouteUnavailable(_) | Self::RouteFetchFailed(_))
    }

    /// Short message suitable for an alert or toast
    pub fn user_message(&self) -> String {
        match self {
            Self::RouteUnavailable(_) => "No driving route found to this station.".to_string(),
            Self::RouteFetchFailed(_) => {
                "Could not load directions. Check your connection and try again.".to_string()
            },
            Self::DiscoveryFailed(_) => "Could not refresh nearby stations.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_errors_are_user_visible() {
        assert!(ApplicationError::RouteUnavailable("a".into()).is_user_visible());
        assert!(ApplicationError::RouteFetchFailed("a".into()).is_user_visible());
        assert!(!ApplicationError::DiscoveryFailed("a".into()).is_user_visible());
        assert!(!ApplicationError::SearchFailed("a".into()).is_user_visible());
        assert!(!ApplicationError::PermissionDenied.is_user_visible());
    }

    #[test]
    fn retryable_errors() {
        assert!(ApplicationError::DiscoveryFailed("x".into()).is_retryable());
        assert!(ApplicationError::RouteFetchFailed("x".into()).is_retryable());
        assert!(!ApplicationError::RouteUnavailable("x".into()).is_retryable());
        assert!(!ApplicationError::PermissionDenied.is_retryable());
    }

    #[test]
    fn user_messages_distinguish_route_failures() {
        let unavailable = ApplicationError::RouteUnavailable("x".into()).user_message();
        let failed = ApplicationError::RouteFetchFailed("x".into()).user_message();
        assert_ne!(unavailable, failed);
        assert!(failed.contains("try again"));
    }

    #[test]
    fn domain_error_is_transparent() {
        let err: ApplicationError = DomainError::ValidationError("bad band".into()).into();
        assert_eq!(err.to_string(), "Validation failed: bad band");
    }
}
