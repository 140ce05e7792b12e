//! Domain entities

mod route;
mod search_result;
mod station;

pub use route::{Route, RouteInfo, RoutePath};
pub use search_result::SearchResult;
pub use station::{PriceBand, Station, sort_by_distance};
