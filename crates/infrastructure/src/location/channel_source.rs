//! Location source fed by the host application

use std::{sync::Arc, time::Duration};

use application::{
    error::ApplicationError,
    ports::{LocationPort, PermissionStatus, PositionWatch, WatchOptions, WatchSubscription},
};
use async_trait::async_trait;
use domain::Coordinate;
use parking_lot::Mutex;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::Instant,
};
use tracing::{debug, info, warn};

/// Default buffer of the position channel
const DEFAULT_BUFFER: usize = 16;

#[derive(Debug)]
struct Watcher {
    tx: mpsc::Sender<Coordinate>,
    subscription: WatchSubscription,
    min_interval: Duration,
    min_distance_m: f64,
    last_sent: Option<(Instant, Coordinate)>,
}

impl Watcher {
    /// Both hints must be met before another fix is forwarded
    fn should_forward(&self, fix: &Coordinate, now: Instant) -> bool {
        self.last_sent.is_none_or(|(at, previous)| {
            now.duration_since(at) >= self.min_interval
                && previous.distance_m(fix) >= self.min_distance_m
        })
    }
}

#[derive(Debug, Default)]
struct Shared {
    last_fix: Option<Coordinate>,
    watcher: Option<Watcher>,
}

/// `LocationPort` backed by fixes pushed through a [`LocationFeed`]
///
/// The host owns the platform location API and forwards every fix it
/// receives. The source applies the watch hints (minimum interval and
/// minimum movement) before passing fixes on.
#[derive(Debug, Clone)]
pub struct ChannelLocationSource {
    permission: PermissionStatus,
    shared: Arc<Mutex<Shared>>,
    buffer: usize,
}

/// Host-side handle of a [`ChannelLocationSource`]
#[derive(Debug, Clone)]
pub struct LocationFeed {
    shared: Arc<Mutex<Shared>>,
}

impl ChannelLocationSource {
    /// Create a source that answers permission requests with `permission`
    pub fn new(permission: PermissionStatus) -> (Self, LocationFeed) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                permission,
                shared: Arc::clone(&shared),
                buffer: DEFAULT_BUFFER,
            },
            LocationFeed { shared },
        )
    }

    /// Override the position channel buffer
    #[must_use]
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }
}

impl LocationFeed {
    /// Deliver a fix from the platform
    ///
    /// Returns `true` if the fix was forwarded to the active watch.
    pub fn push(&self, fix: Coordinate) -> bool {
        let now = Instant::now();
        let mut shared = self.shared.lock();
        shared.last_fix = Some(fix);

        let Some(watcher) = shared.watcher.as_mut() else {
            return false;
        };
        if watcher.subscription.is_cancelled() {
            debug!("Watch cancelled, detaching");
            shared.watcher = None;
            return false;
        }
        if !watcher.should_forward(&fix, now) {
            debug!(%fix, "Fix within watch hints, not forwarded");
            return false;
        }

        match watcher.tx.try_send(fix) {
            Ok(()) => {
                watcher.last_sent = Some((now, fix));
                true
            },
            Err(TrySendError::Full(_)) => {
                warn!(%fix, "Position consumer is lagging, dropping fix");
                false
            },
            Err(TrySendError::Closed(_)) => {
                shared.watcher = None;
                false
            },
        }
    }

    /// Whether a live watch is attached
    pub fn is_watching(&self) -> bool {
        self.shared
            .lock()
            .watcher
            .as_ref()
            .is_some_and(|w| !w.subscription.is_cancelled() && !w.tx.is_closed())
    }
}

#[async_trait]
impl LocationPort for ChannelLocationSource {
    async fn request_permission(&self) -> PermissionStatus {
        debug!(granted = self.permission.granted, "Location permission answered");
        self.permission
    }

    async fn current_position(&self) -> Option<Coordinate> {
        if !self.permission.granted {
            return None;
        }
        self.shared.lock().last_fix
    }

    fn start_watching(&self, options: WatchOptions) -> Result<PositionWatch, ApplicationError> {
        if !self.permission.granted {
            return Err(ApplicationError::PermissionDenied);
        }

        let (tx, watch) = PositionWatch::channel(self.buffer);
        let watcher = Watcher {
            tx,
            subscription: watch.subscription.clone(),
            min_interval: Duration::from_millis(options.min_interval_ms),
            min_distance_m: options.min_distance_m,
            last_sent: None,
        };

        if let Some(previous) = self.shared.lock().watcher.replace(watcher) {
            previous.subscription.cancel();
        }
        info!(
            accuracy = ?options.accuracy,
            min_interval_ms = options.min_interval_ms,
            min_distance_m = options.min_distance_m,
            "Position watch started"
        );
        Ok(watch)
    }
}
