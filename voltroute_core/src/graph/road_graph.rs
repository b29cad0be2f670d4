use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::geopoint::GeoPoint;
use crate::graph::road_class::RoadClass;
use crate::graph::road_segment::{RoadSegment, SegmentIdx};
use crate::graph::waypoint::{Waypoint, WaypointIdx};
use crate::units::Meters;

type SnapObject = GeomWithData<GeoPoint, WaypointIdx>;

/// Directed road graph backed by index arenas. Consumers only ever hold
/// `WaypointIdx`/`SegmentIdx` handles, so cyclic road networks need no
/// pointer cycles.
pub struct RoadGraph {
    waypoints: Vec<Waypoint>,
    segments: Vec<RoadSegment>,
    adjacency: Vec<Vec<SegmentIdx>>,
    snap_index: RTree<SnapObject>,
}

/// The persisted shape of the graph. The snap index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct GraphData {
    waypoints: Vec<Waypoint>,
    segments: Vec<RoadSegment>,
    adjacency: Vec<Vec<SegmentIdx>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        RoadGraph {
            waypoints: Vec::new(),
            segments: Vec::new(),
            adjacency: Vec::new(),
            snap_index: RTree::new(),
        }
    }

    pub fn add_waypoint(&mut self, position: GeoPoint) -> WaypointIdx {
        let idx = WaypointIdx::new(self.waypoints.len());
        self.waypoints.push(Waypoint::new(position));
        self.adjacency.push(Vec::new());
        self.snap_index.insert(SnapObject::new(position, idx));
        idx
    }

    pub fn add_segment(
        &mut self,
        from: WaypointIdx,
        to: WaypointIdx,
        distance: Meters,
        elevation_delta: Meters,
        class: RoadClass,
    ) -> SegmentIdx {
        let idx = SegmentIdx::new(self.segments.len());
        self.segments
            .push(RoadSegment::new(from, to, distance, elevation_delta, class));
        self.adjacency[from.get()].push(idx);
        idx
    }

    /// Adds a two-way road as a forward and a backward segment.
    pub fn add_two_way(
        &mut self,
        a: WaypointIdx,
        b: WaypointIdx,
        distance: Meters,
        elevation_delta: Meters,
        class: RoadClass,
    ) -> (SegmentIdx, SegmentIdx) {
        let forward = self.add_segment(a, b, distance, elevation_delta, class);
        let backward = self.add_segment(b, a, distance, Meters::ZERO - elevation_delta, class);
        (forward, backward)
    }

    /// Outgoing segments of a waypoint.
    pub fn neighbors(&self, node: WaypointIdx) -> impl Iterator<Item = SegmentIdx> + '_ {
        self.adjacency[node.get()].iter().copied()
    }

    pub fn waypoint(&self, idx: WaypointIdx) -> &Waypoint {
        &self.waypoints[idx]
    }

    pub fn segment(&self, idx: SegmentIdx) -> &RoadSegment {
        &self.segments[idx]
    }

    pub fn node_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Closest graph node to `point`, if one lies within `max_radius`.
    pub fn nearest_waypoint(&self, point: &GeoPoint, max_radius: Meters) -> Option<WaypointIdx> {
        self.snap_index
            .nearest_neighbor(&[point.lon, point.lat])
            .filter(|nearest| point.haversine_distance(nearest.geom()) <= max_radius)
            .map(|nearest| nearest.data)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), StorageError> {
        let data = GraphData {
            waypoints: self.waypoints.clone(),
            segments: self.segments.clone(),
            adjacency: self.adjacency.clone(),
        };

        let bytes = bincode::serde::encode_to_vec(&data, bincode::config::standard())
            .map_err(StorageError::EncodeGraph)?;

        let file = File::create(path).map_err(StorageError::WriteGraph)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes).map_err(StorageError::WriteGraph)?;

        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<RoadGraph, StorageError> {
        let file = File::open(path).map_err(StorageError::ReadGraph)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(StorageError::ReadGraph)?;

        let (data, _): (GraphData, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(StorageError::DecodeGraph)?;

        Ok(RoadGraph::from_data(data))
    }

    fn from_data(data: GraphData) -> RoadGraph {
        let snap_index = RTree::bulk_load(
            data.waypoints
                .iter()
                .enumerate()
                .map(|(i, waypoint)| SnapObject::new(*waypoint.position(), WaypointIdx::new(i)))
                .collect(),
        );

        RoadGraph {
            waypoints: data.waypoints,
            segments: data.segments,
            adjacency: data.adjacency,
            snap_index,
        }
    }
}

impl Default for RoadGraph {
    fn default() -> Self {
        RoadGraph::new()
    }
}
