//! Station session - the ride screen controller
//!
//! This module is split into focused sub-modules:
//! - [`discovery`]: position updates, the distance throttle and single-flight station discovery
//! - [`search`]: debounced place search
//! - [`directions`]: driving routes to a station
//!
//! All state lives behind one mutex that is never held across an `.await`.
//! Every completion re-checks the disposed flag and, for search and routing,
//! a request generation before it writes, so late results are dropped
//! instead of overwriting newer state.

mod directions;
mod discovery;
mod events;
mod search;
mod state;
#[cfg(test)]
mod test_support;

use std::{fmt, sync::Arc};

use domain::Coordinate;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

pub use discovery::DiscoveryOutcome;
pub use events::SessionEvent;
pub use state::{ActiveRoute, SearchState, SessionPhase, SessionState};

use crate::{
    config::SessionConfig,
    ports::{GeocodingPort, LocationPort, PositionWatch, StationDiscoveryPort, WatchSubscription},
};

/// Mutable controller state
#[derive(Debug, Default)]
struct Core {
    view: SessionState,
    search_generation: u64,
    route_generation: u64,
    /// Position to discover at once the running discovery finishes
    queued_center: Option<Coordinate>,
}

struct SessionInner {
    location: Arc<dyn LocationPort>,
    discovery: Arc<dyn StationDiscoveryPort>,
    geocoding: Arc<dyn GeocodingPort>,
    config: SessionConfig,
    core: Mutex<Core>,
    /// Lock order: `watch` before `core`
    watch: Mutex<Option<WatchSubscription>>,
    events: broadcast::Sender<SessionEvent>,
}

/// Controller behind the ride screen
///
/// Owns the station list, selection, place search and route overlay for one
/// screen instance. Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct StationSession {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for StationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.core.lock();
        f.debug_struct("StationSession")
            .field("phase", &core.view.phase)
            .field("stations", &core.view.stations.len())
            .field("disposed", &core.view.disposed)
            .finish_non_exhaustive()
    }
}

impl StationSession {
    /// Create a session in the `Initializing` phase
    ///
    /// Nothing happens until [`initialize`](Self::initialize) is called.
    pub fn new(
        location: Arc<dyn LocationPort>,
        discovery: Arc<dyn StationDiscoveryPort>,
        geocoding: Arc<dyn GeocodingPort>,
        config: SessionConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(SessionInner {
                location,
                discovery,
                geocoding,
                config,
                core: Mutex::new(Core::default()),
                watch: Mutex::new(None),
                events,
            }),
        }
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.inner.core.lock().view.clone()
    }

    /// Whether [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.inner.core.lock().view.disposed
    }

    /// Run the permission flow and start following the device
    ///
    /// Granted: starts the position watch and seeds it with a one-shot fix.
    /// Denied, unsupported or a failing watch: switches to the default
    /// location and discovers stations there.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let permission = self.inner.location.request_permission().await;
        if self.is_disposed() {
            debug!("Session disposed while the permission prompt was pending");
            return;
        }

        if !permission.granted {
            info!(
                can_ask_again = permission.can_ask_again,
                "Location permission denied, using default location"
            );
            self.enter_default_mode().await;
            return;
        }

        match self
            .inner
            .location
            .start_watching(self.inner.config.watch.clone())
        {
            Ok(watch) => {
                self.attach_watch(watch);
                if let Some(position) = self.inner.location.current_position().await {
                    self.handle_position_update(position).await;
                }
            },
            Err(e) => {
                warn!(error = %e, "Position watch unavailable");
                match self.inner.location.current_position().await {
                    Some(position) => self.handle_position_update(position).await,
                    None => self.enter_default_mode().await,
                }
            },
        }
    }

    /// Reverse geocode a point for an address label
    pub async fn describe_location(&self, point: Coordinate) -> Option<String> {
        if self.is_disposed() {
            return None;
        }
        self.inner.geocoding.reverse_geocode(point).await
    }

    /// Tear the session down
    ///
    /// Cancels the position watch and makes every later event or late
    /// completion a no-op. Safe to call repeatedly and before
    /// [`initialize`](Self::initialize) has finished.
    pub fn dispose(&self) {
        {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                return;
            }
            core.view.disposed = true;
        }

        if let Some(subscription) = self.inner.watch.lock().take() {
            subscription.cancel();
        }
        info!("Station session disposed");
    }

    async fn enter_default_mode(&self) {
        {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                return;
            }
            core.view.phase = SessionPhase::ReadyDefaultLocation;
        }
        self.emit(SessionEvent::PhaseChanged {
            phase: SessionPhase::ReadyDefaultLocation,
        });

        self.run_discovery(self.inner.config.default_location)
            .await;
    }

    /// Spawn the task that feeds watch updates into the session
    fn attach_watch(&self, watch: PositionWatch) {
        let PositionWatch {
            mut updates,
            subscription,
        } = watch;

        let mut slot = self.inner.watch.lock();
        if self.is_disposed() {
            subscription.cancel();
            return;
        }

        let session = self.clone();
        let stop = subscription.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = stop.cancelled() => break,
                    update = updates.recv() => match update {
                        Some(position) => session.handle_position_update(position).await,
                        None => break,
                    },
                }
            }
            debug!("Position pump stopped");
        });

        if let Some(previous) = slot.replace(subscription) {
            previous.cancel();
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}
