//! Location sources implementing `LocationPort`
//!
//! - [`ChannelLocationSource`]: a host pushes fixes through a [`LocationFeed`]
//! - [`ReplayLocationSource`]: replays a recorded track
//! - [`UnsupportedLocationSource`]: a runtime without location capability

mod channel_source;
mod replay_source;
mod unsupported_source;

pub use channel_source::{ChannelLocationSource, LocationFeed};
pub use replay_source::ReplayLocationSource;
pub use unsupported_source::UnsupportedLocationSource;
