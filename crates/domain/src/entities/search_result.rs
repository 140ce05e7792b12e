//! Free-text place search result

use serde::{Deserialize, Serialize};

use crate::value_objects::Coordinate;

/// One ranked match of a place search; replaced wholesale on each search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider place identifier
    pub place_id: i64,
    /// Full display name, e.g. "Galle Fort, Galle, Southern Province, Sri Lanka"
    pub display_name: String,
    /// Place position
    pub location: Coordinate,
}

impl SearchResult {
    /// First segment of the display name, used as a short title
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.display_name
            .split(',')
            .next()
            .map_or(self.display_name.as_str(), str::trim)
    }
}
