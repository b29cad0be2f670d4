use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::graph::{RoadGraph, SegmentIdx, WaypointIdx};
use crate::routing::astar::SearchPath;
use crate::routing::weighting::Weighting;
use crate::units::Meters;

/// One candidate path between source and destination, with per-node
/// cumulative distance and driving time. Never mutated after creation;
/// charging stops are attached by building an `AugmentedRoute` around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    nodes: Vec<WaypointIdx>,
    segments: Vec<SegmentIdx>,
    /// Distance from the source to `nodes[i]`, in meters.
    cumulative_distance: Vec<f64>,
    /// Driving time from the source to `nodes[i]`.
    cumulative_time: Vec<SignedDuration>,
}

impl RouteCandidate {
    pub fn from_search(graph: &RoadGraph, weighting: &impl Weighting, path: SearchPath) -> Self {
        let mut cumulative_distance = Vec::with_capacity(path.nodes.len());
        let mut cumulative_time = Vec::with_capacity(path.nodes.len());

        let mut distance = 0.0;
        let mut time = SignedDuration::ZERO;
        cumulative_distance.push(distance);
        cumulative_time.push(time);

        for segment_idx in &path.segments {
            let segment = graph.segment(*segment_idx);
            distance += segment.distance().value();
            time += weighting.segment_duration(segment);
            cumulative_distance.push(distance);
            cumulative_time.push(time);
        }

        RouteCandidate {
            nodes: path.nodes,
            segments: path.segments,
            cumulative_distance,
            cumulative_time,
        }
    }

    pub fn nodes(&self) -> &[WaypointIdx] {
        &self.nodes
    }

    pub fn segments(&self) -> &[SegmentIdx] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn source(&self) -> WaypointIdx {
        self.nodes[0]
    }

    pub fn destination(&self) -> WaypointIdx {
        *self.nodes.last().unwrap()
    }

    pub fn total_distance(&self) -> Meters {
        Meters::new(*self.cumulative_distance.last().unwrap())
    }

    pub fn total_time(&self) -> SignedDuration {
        *self.cumulative_time.last().unwrap()
    }

    /// Distance from the source to the i-th node of the path.
    pub fn distance_at_node(&self, index: usize) -> Meters {
        Meters::new(self.cumulative_distance[index])
    }

    /// Driving time from the source to the i-th node of the path.
    pub fn time_at_node(&self, index: usize) -> SignedDuration {
        self.cumulative_time[index]
    }
}
