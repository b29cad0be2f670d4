use crate::graph::{RoadGraph, WaypointIdx};
use crate::routing::astar::AStar;
use crate::routing::astar_heuristic::AStarHeuristic;
use crate::routing::weighting::Weight;

pub struct DijkstraHeuristic;

impl AStarHeuristic for DijkstraHeuristic {
    #[inline(always)]
    fn estimate(&self, _graph: &RoadGraph, _node: WaypointIdx, _end: WaypointIdx) -> Weight {
        0
    }
}

pub struct Dijkstra;

/// Dijkstra is simply a variant of AStar with a zero heuristic
impl Dijkstra {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> AStar<DijkstraHeuristic> {
        AStar::with_heuristic(DijkstraHeuristic)
    }
}
