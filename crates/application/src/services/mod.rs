//! Application services

mod station_session;

pub use station_session::{
    ActiveRoute, DiscoveryOutcome, SearchState, SessionEvent, SessionPhase, SessionState,
    StationSession,
};
