//! Device location port
//!
//! Abstracts the platform location capability: permission prompts, a
//! one-shot fix and a continuous stream of position updates.

use std::sync::Arc;

use async_trait::async_trait;
use domain::Coordinate;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::error::ApplicationError;

/// Outcome of a permission check or prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStatus {
    /// Whether location access is granted
    pub granted: bool,
    /// Whether the platform would show the prompt again
    pub can_ask_again: bool,
}

impl PermissionStatus {
    /// Access granted
    pub const GRANTED: Self = Self {
        granted: true,
        can_ask_again: true,
    };

    /// Access refused, or the capability failed
    pub const DENIED: Self = Self {
        granted: false,
        can_ask_again: false,
    };
}

/// Requested fix accuracy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAccuracy {
    /// City-block level, lowest power
    Low,
    /// Roughly 100 m
    Balanced,
    /// Best available, GPS
    #[default]
    High,
}

/// Hints for a position watch
///
/// Both minimums are advisory: a platform may deliver updates more or less
/// often than requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Requested accuracy
    #[serde(default)]
    pub accuracy: LocationAccuracy,
    /// Minimum time between updates in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Minimum movement between updates in meters
    #[serde(default = "default_min_distance_m")]
    pub min_distance_m: f64,
}

const fn default_min_interval_ms() -> u64 {
    5000
}

const fn default_min_distance_m() -> f64 {
    50.0
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: LocationAccuracy::High,
            min_interval_ms: default_min_interval_ms(),
            min_distance_m: default_min_distance_m(),
        }
    }
}

/// Handle that stops a position watch
///
/// Cloning shares the same underlying watch. `cancel` is idempotent and may
/// be called after every other party is gone.
#[derive(Debug, Clone)]
pub struct WatchSubscription {
    cancelled: Arc<watch::Sender<bool>>,
}

impl WatchSubscription {
    /// Create a live subscription
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            cancelled: Arc::new(tx),
        }
    }

    /// Stop the watch
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    /// Whether `cancel` has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once the watch is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // The sender lives in `self`, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for WatchSubscription {
    fn default() -> Self {
        Self::new()
    }
}

/// A running position watch: the update stream plus its cancel handle
#[derive(Debug)]
pub struct PositionWatch {
    /// Position updates, in delivery order
    pub updates: mpsc::Receiver<Coordinate>,
    /// Stops the producer
    pub subscription: WatchSubscription,
}

impl PositionWatch {
    /// Create a watch and the sender a producer feeds it through
    #[must_use]
    pub fn channel(buffer: usize) -> (mpsc::Sender<Coordinate>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (
            tx,
            Self {
                updates: rx,
                subscription: WatchSubscription::new(),
            },
        )
    }
}

/// Device location port
///
/// Implementations never fail a permission request: any underlying error is
/// reported as [`PermissionStatus::DENIED`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationPort: Send + Sync {
    /// Check the current permission and prompt if it is not yet granted
    async fn request_permission(&self) -> PermissionStatus;

    /// One-shot position fix, `None` if unavailable
    async fn current_position(&self) -> Option<Coordinate>;

    /// Start a continuous position watch
    ///
    /// # Errors
    ///
    /// Returns `LocationUnavailable` if the platform cannot watch positions.
    fn start_watching(&self, options: WatchOptions) -> Result<PositionWatch, ApplicationError>;
}
