//! Position updates and station discovery

use domain::{Coordinate, Station, sort_by_distance};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::{Core, SessionEvent, SessionPhase, StationSession};
use crate::error::ApplicationError;

/// Result of a discovery trigger
#[derive(Debug, Clone)]
pub enum DiscoveryOutcome {
    /// The station list was replaced
    Updated { count: usize },
    /// Another discovery was already running; this trigger was dropped
    Skipped,
    /// The query failed; the previous list is kept
    Failed(ApplicationError),
    /// The session was disposed before the result could be applied
    Disposed,
}

impl DiscoveryOutcome {
    /// Whether the station list was replaced
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Clears the in-flight flag if the discovery future is dropped mid-fetch
struct InFlight<'a> {
    core: &'a Mutex<Core>,
    armed: bool,
}

impl InFlight<'_> {
    /// The flag is now managed under the core lock
    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut core = self.core.lock();
        if !core.view.disposed {
            core.view.discovery_in_flight = false;
            core.queued_center = None;
        }
    }
}

impl StationSession {
    /// Feed a device position into the session
    ///
    /// The first position makes the session ready and always discovers
    /// stations around it. Later positions discover again when no fetch has
    /// succeeded yet or the device moved more than the refetch threshold
    /// away from the last fetch center.
    #[instrument(skip(self), fields(position = %position))]
    pub async fn handle_position_update(&self, position: Coordinate) {
        let (phase_changed, fetch) = {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                debug!("Ignoring position update after dispose");
                return;
            }

            core.view.current_location = Some(position);
            let phase_changed = core.view.phase != SessionPhase::ReadyWithLocation;
            core.view.phase = SessionPhase::ReadyWithLocation;

            let fetch = phase_changed
                || core.view.last_fetched_location.is_none_or(|last| {
                    last.distance_km(&position) > self.inner.config.refetch_threshold_km
                });
            (phase_changed, fetch)
        };

        if phase_changed {
            info!("Following device location");
            self.emit(SessionEvent::PhaseChanged {
                phase: SessionPhase::ReadyWithLocation,
            });
        }

        if fetch {
            // The first fix must not be lost to a refresh that is still running
            self.discover(position, phase_changed).await;
        } else {
            debug!("Within refetch threshold, keeping station list");
        }
    }

    /// Re-run discovery at the current location, or the default one
    pub async fn refresh_stations(&self) -> DiscoveryOutcome {
        let center = {
            let core = self.inner.core.lock();
            core.view
                .current_location
                .unwrap_or(self.inner.config.default_location)
        };
        self.run_discovery(center).await
    }

    /// Overwrite the selected station
    pub fn select_station(&self, station: Option<Station>) {
        let mut core = self.inner.core.lock();
        if core.view.disposed {
            return;
        }
        core.view.selected_station = station;
    }

    /// Single-flight station discovery around `center`
    pub(super) async fn run_discovery(&self, center: Coordinate) -> DiscoveryOutcome {
        self.discover(center, false).await
    }

    /// Discovery around `center`
    ///
    /// While another discovery is running the trigger is dropped, unless
    /// `queue_if_busy` is set: then the running discovery fetches again at
    /// `center` once it has applied its own result.
    #[instrument(skip(self), fields(center = %center))]
    async fn discover(&self, mut center: Coordinate, queue_if_busy: bool) -> DiscoveryOutcome {
        {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                return DiscoveryOutcome::Disposed;
            }
            if core.view.discovery_in_flight {
                if queue_if_busy {
                    debug!("Discovery in flight, queueing this center");
                    core.queued_center = Some(center);
                } else {
                    debug!("Discovery already in flight, dropping trigger");
                }
                return DiscoveryOutcome::Skipped;
            }
            core.view.discovery_in_flight = true;
        }

        let mut guard = InFlight {
            core: &self.inner.core,
            armed: true,
        };
        loop {
            let result = self
                .inner
                .discovery
                .find_nearby_stations(center, self.inner.config.search_radius_m)
                .await;

            let mut core = self.inner.core.lock();
            guard.disarm();
            if core.view.disposed {
                debug!("Discarding discovery result after dispose");
                return DiscoveryOutcome::Disposed;
            }

            // Result and flag change in one critical section
            let next = core.queued_center.take().filter(|next| *next != center);
            if next.is_none() {
                core.view.discovery_in_flight = false;
            } else {
                guard.armed = true;
            }
            let outcome = self.apply_discovery(core, center, result);

            match next {
                Some(queued) => center = queued,
                None => return outcome,
            }
        }
    }

    /// Write a discovery result, then release the lock and notify
    fn apply_discovery(
        &self,
        mut core: MutexGuard<'_, Core>,
        center: Coordinate,
        result: Result<Vec<Station>, ApplicationError>,
    ) -> DiscoveryOutcome {
        match result {
            Ok(mut stations) => {
                sort_by_distance(&mut stations);
                let count = stations.len();

                let view = &mut core.view;
                view.last_fetched_location = Some(center);
                match view.selected_station.as_mut() {
                    // Keep the user's pick; refresh it if it is still listed
                    Some(selected) => {
                        if let Some(fresh) = stations.iter().find(|s| s.id == selected.id) {
                            *selected = fresh.clone();
                        }
                    },
                    None => view.selected_station = stations.first().cloned(),
                }
                view.stations = stations;
                drop(core);

                info!(count, "Station list updated");
                self.emit(SessionEvent::StationsUpdated { count, center });
                DiscoveryOutcome::Updated { count }
            },
            Err(err) => {
                drop(core);
                warn!(error = %err, "Station discovery failed, keeping previous list");
                self.emit(SessionEvent::DiscoveryFailed {
                    message: err.to_string(),
                });
                DiscoveryOutcome::Failed(err)
            },
        }
    }
}
