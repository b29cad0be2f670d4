use crate::graph::{RoadGraph, WaypointIdx};
use crate::routing::weighting::Weight;
use crate::units::Kmh;

pub trait AStarHeuristic {
    fn estimate(&self, graph: &RoadGraph, node: WaypointIdx, end: WaypointIdx) -> Weight;
}

/// Straight-line distance at the fastest speed any road class allows. Never
/// overestimates the true remaining travel time, which keeps A* optimal.
pub struct HaversineHeuristic {
    max_speed: Kmh,
}

impl HaversineHeuristic {
    pub fn new() -> Self {
        HaversineHeuristic {
            max_speed: Kmh::new(120.0),
        }
    }
}

impl Default for HaversineHeuristic {
    fn default() -> Self {
        HaversineHeuristic::new()
    }
}

impl AStarHeuristic for HaversineHeuristic {
    fn estimate(&self, graph: &RoadGraph, node: WaypointIdx, end: WaypointIdx) -> Weight {
        let from = graph.waypoint(node).position();
        let to = graph.waypoint(end).position();

        let duration = from.haversine_distance(to) / self.max_speed;
        duration.as_millis() as Weight
    }
}
