//! Location source for runtimes without a location capability

use application::{
    error::ApplicationError,
    ports::{LocationPort, PermissionStatus, PositionWatch, WatchOptions},
};
use async_trait::async_trait;
use domain::Coordinate;
use tracing::debug;

/// Always denies permission and never produces a position
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocationSource;

#[async_trait]
impl LocationPort for UnsupportedLocationSource {
    async fn request_permission(&self) -> PermissionStatus {
        debug!("Location is not supported on this runtime");
        PermissionStatus::DENIED
    }

    async fn current_position(&self) -> Option<Coordinate> {
        None
    }

    fn start_watching(&self, _options: WatchOptions) -> Result<PositionWatch, ApplicationError> {
        Err(ApplicationError::LocationUnavailable(
            "location is not supported on this runtime".to_string(),
        ))
    }
}
