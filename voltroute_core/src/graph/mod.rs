pub mod road_class;
pub mod road_graph;
pub mod road_segment;
pub mod waypoint;

pub use road_class::RoadClass;
pub use road_graph::RoadGraph;
pub use road_segment::{RoadSegment, SegmentIdx};
pub use waypoint::{Waypoint, WaypointIdx};
