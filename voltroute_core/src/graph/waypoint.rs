use serde::{Deserialize, Serialize};

use crate::define_index_newtype;
use crate::geopoint::GeoPoint;

define_index_newtype!(WaypointIdx, Waypoint);

/// A node of the road graph. Immutable once added.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Waypoint {
    position: GeoPoint,
}

impl Waypoint {
    pub fn new(position: GeoPoint) -> Self {
        Waypoint { position }
    }

    pub fn position(&self) -> &GeoPoint {
        &self.position
    }
}
