//! Hand-written fakes and fixtures for the session tests
//!
//! The mockall mocks cover simple call expectations. These fakes exist for
//! tests that need to hold a call in flight, count calls made from spawned
//! tasks, or push position updates.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use domain::{Coordinate, Route, RouteInfo, RoutePath, SearchResult, Station};
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore, broadcast, mpsc};

use super::{SessionEvent, SessionPhase, StationSession};
use crate::{
    config::SessionConfig,
    error::ApplicationError,
    ports::{
        GeocodingPort, LocationPort, MockGeocodingPort, MockLocationPort,
        MockStationDiscoveryPort, PermissionStatus, PositionWatch, StationDiscoveryPort,
        WatchOptions, WatchSubscription,
    },
};

pub const GALLE_FORT: Coordinate = Coordinate::new_unchecked(6.0329, 80.2168);

pub fn station(id: &str, distance_km: f64) -> Station {
    Station {
        id: id.to_string(),
        name: format!("Station {id}"),
        price_per_liter: 370.0,
        location: Coordinate::new_unchecked(6.03 + distance_km / 111.0, 80.22),
        distance_km,
    }
}

pub fn place(place_id: i64, display_name: &str) -> SearchResult {
    SearchResult {
        place_id,
        display_name: display_name.to_string(),
        location: GALLE_FORT,
    }
}

/// 12.3 km / 15 min route with a two-point path
pub fn sample_route() -> Route {
    Route {
        path: RoutePath::new(vec![
            Coordinate::new_unchecked(6.03, 80.22),
            Coordinate::new_unchecked(6.04, 80.23),
        ]),
        info: RouteInfo::from_measurements(12_300.0, 900.0),
    }
}

pub fn session_with(
    location: MockLocationPort,
    discovery: MockStationDiscoveryPort,
    geocoding: MockGeocodingPort,
) -> StationSession {
    StationSession::new(
        Arc::new(location),
        Arc::new(discovery),
        Arc::new(geocoding),
        SessionConfig::for_testing(),
    )
}

pub fn fake_session(
    location: &FakeLocation,
    discovery: &FakeDiscovery,
    geocoding: &FakeGeocoding,
) -> StationSession {
    fake_session_with_config(location, discovery, geocoding, SessionConfig::for_testing())
}

pub fn fake_session_with_config(
    location: &FakeLocation,
    discovery: &FakeDiscovery,
    geocoding: &FakeGeocoding,
    config: SessionConfig,
) -> StationSession {
    StationSession::new(
        Arc::new(location.clone()),
        Arc::new(discovery.clone()),
        Arc::new(geocoding.clone()),
        config,
    )
}

/// Wait (bounded) for the first event matching `pred`
pub async fn wait_for_event(
    events: &mut broadcast::Receiver<SessionEvent>,
    pred: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {},
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}

impl StationSession {
    /// Put the session at `position` without triggering discovery
    pub fn place_at(&self, position: Coordinate) {
        let mut core = self.inner.core.lock();
        core.view.current_location = Some(position);
        core.view.phase = SessionPhase::ReadyWithLocation;
    }
}

// --- Location ---

struct LocationState {
    permission: PermissionStatus,
    prompt: Option<Arc<Notify>>,
    prompted: bool,
    fix: Option<Coordinate>,
    watch: Option<PositionWatch>,
    feed: Option<mpsc::Sender<Coordinate>>,
    subscription: Option<WatchSubscription>,
    watch_starts: usize,
}

#[derive(Clone)]
pub struct FakeLocation(Arc<Mutex<LocationState>>);

impl FakeLocation {
    fn with_permission(permission: PermissionStatus) -> Self {
        let (feed, watch) = PositionWatch::channel(8);
        let subscription = watch.subscription.clone();
        Self(Arc::new(Mutex::new(LocationState {
            permission,
            prompt: None,
            prompted: false,
            fix: None,
            watch: Some(watch),
            feed: Some(feed),
            subscription: Some(subscription),
            watch_starts: 0,
        })))
    }

    pub fn granted() -> Self {
        Self::with_permission(PermissionStatus::GRANTED)
    }

    pub fn denied() -> Self {
        Self::with_permission(PermissionStatus::DENIED)
    }

    /// Permission prompt that only answers once the returned notify fires
    pub fn pending_permission(answer: PermissionStatus) -> (Self, Arc<Notify>) {
        let fake = Self::with_permission(answer);
        let gate = Arc::new(Notify::new());
        fake.0.lock().prompt = Some(Arc::clone(&gate));
        (fake, gate)
    }

    pub fn without_watch(self) -> Self {
        {
            let mut state = self.0.lock();
            state.watch = None;
            state.feed = None;
            state.subscription = None;
        }
        self
    }

    pub fn with_fix(self, fix: Coordinate) -> Self {
        self.0.lock().fix = Some(fix);
        self
    }

    pub fn feed(&self) -> mpsc::Sender<Coordinate> {
        self.0.lock().feed.clone().expect("fake has no watch")
    }

    pub fn subscription(&self) -> WatchSubscription {
        self.0.lock().subscription.clone().expect("fake has no watch")
    }

    pub fn watch_starts(&self) -> usize {
        self.0.lock().watch_starts
    }

    /// Resolves once `request_permission` has been entered
    pub async fn wait_for_prompt(&self) {
        while !self.0.lock().prompted {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl LocationPort for FakeLocation {
    async fn request_permission(&self) -> PermissionStatus {
        let (permission, prompt) = {
            let state = self.0.lock();
            (state.permission, state.prompt.clone())
        };
        if let Some(gate) = prompt {
            let notified = gate.notified();
            self.0.lock().prompted = true;
            notified.await;
        }
        permission
    }

    async fn current_position(&self) -> Option<Coordinate> {
        self.0.lock().fix
    }

    fn start_watching(&self, _options: WatchOptions) -> Result<PositionWatch, ApplicationError> {
        let mut state = self.0.lock();
        state.watch_starts += 1;
        state
            .watch
            .take()
            .ok_or_else(|| ApplicationError::LocationUnavailable("no watch support".into()))
    }
}

// --- Discovery ---

#[derive(Default)]
struct DiscoveryState {
    calls: Vec<(Coordinate, u32)>,
    queued: VecDeque<Result<Vec<Station>, ApplicationError>>,
    fallback: Vec<Station>,
}

#[derive(Clone)]
pub struct FakeDiscovery {
    state: Arc<Mutex<DiscoveryState>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeDiscovery {
    /// Answers with queued responses first, then always with `stations`
    pub fn returning(stations: Vec<Station>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DiscoveryState {
                fallback: stations,
                ..DiscoveryState::default()
            })),
            gate: None,
        }
    }

    /// Every call waits for one permit on the returned semaphore
    pub fn gated(stations: Vec<Station>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let fake = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::returning(stations)
        };
        (fake, gate)
    }

    pub fn push(&self, response: Result<Vec<Station>, ApplicationError>) {
        self.state.lock().queued.push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn centers(&self) -> Vec<Coordinate> {
        self.state.lock().calls.iter().map(|(c, _)| *c).collect()
    }

    pub fn radii(&self) -> Vec<u32> {
        self.state.lock().calls.iter().map(|(_, r)| *r).collect()
    }
}

#[async_trait]
impl StationDiscoveryPort for FakeDiscovery {
    async fn find_nearby_stations(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<Station>, ApplicationError> {
        let response = {
            let mut state = self.state.lock();
            state.calls.push((center, radius_m));
            state
                .queued
                .pop_front()
                .unwrap_or_else(|| Ok(state.fallback.clone()))
        };
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        response
    }
}

// --- Geocoding ---

type RouteResponse = (Duration, Result<Option<Route>, ApplicationError>);

#[derive(Default)]
struct GeocodingState {
    results: Vec<SearchResult>,
    search_delay: Duration,
    searches: Vec<(String, Option<String>)>,
    routes: VecDeque<RouteResponse>,
    route_origins: Vec<Coordinate>,
}

#[derive(Clone, Default)]
pub struct FakeGeocoding(Arc<Mutex<GeocodingState>>);

impl FakeGeocoding {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        let fake = Self::default();
        fake.0.lock().results = results;
        fake
    }

    pub fn with_search_delay(self, delay: Duration) -> Self {
        self.0.lock().search_delay = delay;
        self
    }

    pub fn with_route(self, response: Result<Option<Route>, ApplicationError>) -> Self {
        self.with_delayed_route(Duration::ZERO, response)
    }

    pub fn with_delayed_route(
        self,
        delay: Duration,
        response: Result<Option<Route>, ApplicationError>,
    ) -> Self {
        self.0.lock().routes.push_back((delay, response));
        self
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.0.lock().searches.iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn search_countries(&self) -> Vec<Option<String>> {
        self.0.lock().searches.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn route_origins(&self) -> Vec<Coordinate> {
        self.0.lock().route_origins.clone()
    }
}

#[async_trait]
impl GeocodingPort for FakeGeocoding {
    async fn search_places(&self, text: &str, country_filter: Option<String>) -> Vec<SearchResult> {
        let (delay, results) = {
            let mut state = self.0.lock();
            state.searches.push((text.to_string(), country_filter));
            (state.search_delay, state.results.clone())
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        results
    }

    async fn reverse_geocode(&self, _point: Coordinate) -> Option<String> {
        None
    }

    async fn fetch_route(
        &self,
        start: Coordinate,
        _end: Coordinate,
    ) -> Result<Option<Route>, ApplicationError> {
        let (delay, response) = {
            let mut state = self.0.lock();
            state.route_origins.push(start);
            state
                .routes
                .pop_front()
                .unwrap_or((Duration::ZERO, Ok(None)))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response
    }
}
