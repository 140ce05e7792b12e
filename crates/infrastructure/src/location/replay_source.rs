//! Location source replaying a recorded track

use std::{path::Path, time::Duration};

use application::{
    error::ApplicationError,
    ports::{LocationPort, PermissionStatus, PositionWatch, WatchOptions},
};
use async_trait::async_trait;
use domain::Coordinate;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Default delay between replayed fixes
const DEFAULT_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct RawFix {
    latitude: f64,
    longitude: f64,
}

/// Replays a fixed sequence of positions as a position watch
///
/// Permission is always granted. The first point of the track doubles as the
/// one-shot fix. Each watch replays the full track from the start.
#[derive(Debug, Clone)]
pub struct ReplayLocationSource {
    track: Vec<Coordinate>,
    pacing: Duration,
}

impl ReplayLocationSource {
    /// Create a replay of `track`
    pub fn new(track: Vec<Coordinate>) -> Self {
        Self {
            track,
            pacing: DEFAULT_PACING,
        }
    }

    /// Set the delay between fixes
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Parse a JSON array of `{ "latitude": .., "longitude": .. }` objects
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed JSON, an empty track or
    /// out-of-range coordinates.
    pub fn from_json(json: &str) -> Result<Self, ApplicationError> {
        let raw: Vec<RawFix> = serde_json::from_str(json)
            .map_err(|e| ApplicationError::Configuration(format!("invalid track: {e}")))?;

        let track = raw
            .into_iter()
            .enumerate()
            .map(|(i, fix)| {
                Coordinate::new(fix.latitude, fix.longitude).map_err(|e| {
                    ApplicationError::Configuration(format!("track point {i}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if track.is_empty() {
            return Err(ApplicationError::Configuration(
                "track contains no points".to_string(),
            ));
        }
        Ok(Self::new(track))
    }

    /// Load a track file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ApplicationError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Number of points in the track
    pub fn len(&self) -> usize {
        self.track.len()
    }

    /// Whether the track is empty
    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }
}

#[async_trait]
impl LocationPort for ReplayLocationSource {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::GRANTED
    }

    async fn current_position(&self) -> Option<Coordinate> {
        self.track.first().copied()
    }

    fn start_watching(&self, _options: WatchOptions) -> Result<PositionWatch, ApplicationError> {
        let (tx, watch) = PositionWatch::channel(self.track.len());
        let stop = watch.subscription.clone();
        let track = self.track.clone();
        let pacing = self.pacing;

        if track.is_empty() {
            warn!("Location track is empty, no position will be reported");
        } else {
            info!(points = track.len(), ?pacing, "Replaying location track");
        }
        tokio::spawn(async move {
            for fix in track {
                tokio::select! {
                    () = stop.cancelled() => break,
                    () = tokio::time::sleep(pacing) => {},
                }
                if tx.send(fix).await.is_err() {
                    break;
                }
            }
            debug!("Track replay finished");
        });

        Ok(watch)
    }
}
