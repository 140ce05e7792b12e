//! Driving directions to a station

use domain::{RouteInfo, Station};
use tracing::{debug, info, instrument, warn};

use super::{ActiveRoute, SessionEvent, StationSession};
use crate::error::ApplicationError;

impl StationSession {
    /// Fetch and show a driving route to `station`
    ///
    /// Starts from the current location, or the default location once the
    /// session is ready. Returns `Ok(None)` without a request when there is
    /// no origin yet, and also when a newer directions request or
    /// [`clear_directions`](Self::clear_directions) superseded this one.
    /// The selected station is left unchanged.
    ///
    /// # Errors
    ///
    /// `RouteUnavailable` when the routing service knows no route,
    /// `RouteFetchFailed` when the request could not be completed. Either
    /// way the route overlay is removed.
    #[instrument(skip(self, station), fields(station_id = %station.id))]
    pub async fn request_directions(
        &self,
        station: &Station,
    ) -> Result<Option<RouteInfo>, ApplicationError> {
        let (origin, generation) = {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                return Ok(None);
            }
            let Some(origin) = core
                .view
                .reference_location(self.inner.config.default_location)
            else {
                debug!("No origin yet, ignoring directions request");
                return Ok(None);
            };
            core.route_generation += 1;
            (origin, core.route_generation)
        };

        let outcome = match self
            .inner
            .geocoding
            .fetch_route(origin, station.location)
            .await
        {
            Ok(Some(route)) => Ok(route),
            Ok(None) => Err(ApplicationError::RouteUnavailable(format!(
                "no driving route from {origin} to {}",
                station.name
            ))),
            Err(err @ ApplicationError::RouteFetchFailed(_)) => Err(err),
            Err(other) => Err(ApplicationError::RouteFetchFailed(other.to_string())),
        };

        {
            let mut core = self.inner.core.lock();
            if core.view.disposed || core.route_generation != generation {
                debug!("Discarding superseded route response");
                return Ok(None);
            }
            core.view.route = outcome.as_ref().ok().map(|route| ActiveRoute {
                target: station.clone(),
                route: route.clone(),
            });
        }

        match outcome {
            Ok(route) => {
                info!(
                    distance = %route.info.distance_label,
                    duration = %route.info.duration_label,
                    points = route.path.len(),
                    "Route ready"
                );
                self.emit(SessionEvent::RouteReady {
                    info: route.info.clone(),
                });
                Ok(Some(route.info))
            },
            Err(err) => {
                warn!(error = %err, "Directions request failed");
                self.emit(SessionEvent::RouteFailed {
                    message: err.user_message(),
                });
                Err(err)
            },
        }
    }

    /// Remove the route overlay
    pub fn clear_directions(&self) {
        let had_route = {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                return;
            }
            core.route_generation += 1;
            core.view.route.take().is_some()
        };
        if had_route {
            self.emit(SessionEvent::RouteCleared);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use domain::{Coordinate, RouteInfo};

    use crate::error::ApplicationError;
    use crate::ports::{MockGeocodingPort, MockLocationPort, MockStationDiscoveryPort};
    use crate::services::station_session::{SessionEvent, test_support::*};

    #[tokio::test]
    async fn route_round_trip() {
        let target = station("a", 1.2);
        let target_location = target.location;

        let mut geocoding = MockGeocodingPort::new();
        geocoding
            .expect_fetch_route()
            .withf(move |start, end| *start == GALLE_FORT && *end == target_location)
            .times(1)
            .returning(|_, _| Ok(Some(sample_route())));

        let session = session_with(MockLocationPort::new(), MockStationDiscoveryPort::new(), geocoding);
        session.place_at(GALLE_FORT);
        let mut events = session.subscribe();

        let info = session.request_directions(&target).await.unwrap();
        assert_eq!(
            info,
            Some(RouteInfo {
                distance_label: "12.3 km".to_string(),
                duration_label: "15 min".to_string(),
            })
        );

        let active = session.snapshot().route.unwrap();
        assert_eq!(active.target.id, "a");
        assert_eq!(active.route.path.len(), 2);
        assert_eq!(
            active.route.path.start(),
            Some(&Coordinate::new_unchecked(6.03, 80.22))
        );
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::RouteReady { .. }
        ));
    }

    #[tokio::test]
    async fn no_origin_while_initializing_is_a_no_op() {
        let mut geocoding = MockGeocodingPort::new();
        geocoding.expect_fetch_route().never();

        let session = session_with(MockLocationPort::new(), MockStationDiscoveryPort::new(), geocoding);
        let result = session.request_directions(&station("a", 1.0)).await;

        assert!(matches!(result, Ok(None)));
        assert!(session.snapshot().route.is_none());
    }

    #[tokio::test]
    async fn default_location_is_the_origin_without_fix() {
        let geocoding = FakeGeocoding::default().with_route(Ok(Some(sample_route())));
        let session = fake_session(
            &FakeLocation::denied(),
            &FakeDiscovery::returning(vec![]),
            &geocoding,
        );
        session.initialize().await;

        session.request_directions(&station("a", 1.0)).await.unwrap();
        assert_eq!(
            geocoding.route_origins(),
            vec![Coordinate::DEFAULT_RIDE_ORIGIN]
        );
    }

    #[tokio::test]
    async fn no_route_is_route_unavailable() {
        let mut geocoding = MockGeocodingPort::new();
        geocoding.expect_fetch_route().returning(|_, _| Ok(None));

        let session = session_with(MockLocationPort::new(), MockStationDiscoveryPort::new(), geocoding);
        session.place_at(GALLE_FORT);
        let mut events = session.subscribe();

        let err = session
            .request_directions(&station("a", 1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::RouteUnavailable(_)));
        assert!(err.is_user_visible());
        assert!(session.snapshot().route.is_none());
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::RouteFailed { .. }
        ));
    }

    #[tokio::test]
    async fn fetch_failure_is_route_fetch_failed() {
        let mut geocoding = MockGeocodingPort::new();
        geocoding
            .expect_fetch_route()
            .returning(|_, _| Err(ApplicationError::RouteFetchFailed("connection reset".into())));

        let session = session_with(MockLocationPort::new(), MockStationDiscoveryPort::new(), geocoding);
        session.place_at(GALLE_FORT);

        let err = session
            .request_directions(&station("a", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::RouteFetchFailed(_)));
    }

    #[tokio::test]
    async fn failure_replaces_an_active_route() {
        let geocoding = FakeGeocoding::default()
            .with_route(Ok(Some(sample_route())))
            .with_route(Err(ApplicationError::RouteFetchFailed("timeout".into())));
        let session = fake_session(
            &FakeLocation::denied(),
            &FakeDiscovery::returning(vec![]),
            &geocoding,
        );
        session.initialize().await;

        session.request_directions(&station("a", 1.0)).await.unwrap();
        assert!(session.snapshot().route.is_some());

        assert!(session.request_directions(&station("b", 2.0)).await.is_err());
        assert!(session.snapshot().route.is_none());
    }

    #[tokio::test]
    async fn directions_do_not_change_selection() {
        let geocoding = FakeGeocoding::default().with_route(Ok(Some(sample_route())));
        let session = fake_session(
            &FakeLocation::denied(),
            &FakeDiscovery::returning(vec![station("a", 1.0)]),
            &geocoding,
        );
        session.initialize().await;

        session.request_directions(&station("b", 2.0)).await.unwrap();
        let state = session.snapshot();
        assert_eq!(state.selected_station.map(|s| s.id), Some("a".to_string()));
        assert_eq!(state.route.map(|r| r.target.id), Some("b".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn latest_request_wins() {
        let slow = sample_route();
        let fast = domain::Route {
            info: RouteInfo::from_measurements(2_000.0, 240.0),
            ..sample_route()
        };
        let geocoding = FakeGeocoding::default()
            .with_delayed_route(Duration::from_millis(300), Ok(Some(slow)))
            .with_delayed_route(Duration::from_millis(50), Ok(Some(fast)));
        let session = fake_session(
            &FakeLocation::denied(),
            &FakeDiscovery::returning(vec![]),
            &geocoding,
        );
        session.initialize().await;

        let (far, near) = (station("a", 12.0), station("b", 2.0));
        let (first, second) = tokio::join!(
            session.request_directions(&far),
            session.request_directions(&near),
        );

        assert_eq!(first.unwrap(), None);
        assert_eq!(second.unwrap().unwrap().distance_label, "2.0 km");
        let active = session.snapshot().route.unwrap();
        assert_eq!(active.target.id, "b");
        assert_eq!(active.route.info.duration_label, "4 min");
    }

    #[tokio::test]
    async fn clear_directions_removes_route() {
        let geocoding = FakeGeocoding::default().with_route(Ok(Some(sample_route())));
        let session = fake_session(
            &FakeLocation::denied(),
            &FakeDiscovery::returning(vec![]),
            &geocoding,
        );
        session.initialize().await;
        session.request_directions(&station("a", 1.0)).await.unwrap();
        let mut events = session.subscribe();

        session.clear_directions();
        session.clear_directions();

        assert!(session.snapshot().route.is_none());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::RouteCleared);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_discards_in_flight_route() {
        let geocoding = FakeGeocoding::default()
            .with_delayed_route(Duration::from_millis(100), Ok(Some(sample_route())));
        let session = fake_session(
            &FakeLocation::denied(),
            &FakeDiscovery::returning(vec![]),
            &geocoding,
        );
        session.initialize().await;

        let target = station("a", 1.0);
        let (result, ()) = tokio::join!(session.request_directions(&target), async {
            session.clear_directions();
        });

        assert_eq!(result.unwrap(), None);
        assert!(session.snapshot().route.is_none());
    }
}
