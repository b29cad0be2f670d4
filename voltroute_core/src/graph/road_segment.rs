use serde::{Deserialize, Serialize};

use crate::define_index_newtype;
use crate::graph::road_class::RoadClass;
use crate::graph::waypoint::WaypointIdx;
use crate::units::Meters;

define_index_newtype!(SegmentIdx, RoadSegment);

/// A directed traversable road segment. Two-way roads are modelled as a pair
/// of segments with mirrored elevation deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadSegment {
    from: WaypointIdx,
    to: WaypointIdx,
    distance: Meters,
    elevation_delta: Meters,
    class: RoadClass,
}

impl RoadSegment {
    pub fn new(
        from: WaypointIdx,
        to: WaypointIdx,
        distance: Meters,
        elevation_delta: Meters,
        class: RoadClass,
    ) -> Self {
        RoadSegment {
            from,
            to,
            distance,
            elevation_delta,
            class,
        }
    }

    pub fn from_node(&self) -> WaypointIdx {
        self.from
    }

    pub fn to_node(&self) -> WaypointIdx {
        self.to
    }

    pub fn distance(&self) -> Meters {
        self.distance
    }

    /// Positive when the segment climbs, negative when it descends.
    pub fn elevation_delta(&self) -> Meters {
        self.elevation_delta
    }

    pub fn class(&self) -> RoadClass {
        self.class
    }
}
