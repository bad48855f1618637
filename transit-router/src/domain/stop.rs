//! Transit stop type.

use serde::{Deserialize, Serialize};

use crate::geo::LatLon;

/// A physical transit stop on a line's stop sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportStop {
    /// Stable identifier from the map data.
    pub id: u64,

    /// Stop location.
    pub location: LatLon,

    /// Display name.
    pub name: String,
}

impl TransportStop {
    /// Create a stop.
    pub fn new(id: u64, location: LatLon, name: impl Into<String>) -> Self {
        Self {
            id,
            location,
            name: name.into(),
        }
    }
}
