use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fxhash::FxHashMap;

use crate::error::PlanError;
use crate::graph::{RoadGraph, SegmentIdx, WaypointIdx};
use crate::routing::astar_heuristic::{AStarHeuristic, HaversineHeuristic};
use crate::routing::weighting::{MAX_WEIGHT, Weight, Weighting};

#[derive(Eq, Copy, Clone, Debug)]
struct HeapItem {
    node: WaypointIdx,

    /// Cheapest known weight from the start to `node`.
    g_score: Weight,

    /// `g_score` plus the heuristic estimate from `node` to the end.
    f_score: Weight,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &HeapItem) -> bool {
        self.f_score == other.f_score && self.g_score == other.g_score
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &HeapItem) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip weight to make this a min-heap
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.g_score.cmp(&self.g_score))
            .then_with(|| self.node.cmp(&other.node))
    }
}

struct NodeData {
    settled: bool,
    weight: Weight,
    // Segment taken from the parent into this node
    parent: Option<(WaypointIdx, SegmentIdx)>,
}

impl NodeData {
    fn new() -> Self {
        NodeData {
            settled: false,
            weight: MAX_WEIGHT,
            parent: None,
        }
    }
}

/// A path found by the search, as node and segment index sequences plus the
/// accumulated weight.
#[derive(Debug, Clone)]
pub struct SearchPath {
    pub nodes: Vec<WaypointIdx>,
    pub segments: Vec<SegmentIdx>,
    pub weight: Weight,
}

pub struct AStar<H: AStarHeuristic> {
    heap: BinaryHeap<HeapItem>,
    // A map instead of a node-indexed vector: searches touch a tiny fraction
    // of a continent-sized graph.
    data: FxHashMap<WaypointIdx, NodeData>,
    heuristic: H,
}

impl<H: AStarHeuristic> AStar<H> {
    pub fn with_heuristic(heuristic: H) -> AStar<H> {
        AStar {
            heap: BinaryHeap::with_capacity(1024),
            data: FxHashMap::default(),
            heuristic,
        }
    }

    fn init(&mut self, graph: &RoadGraph, start: WaypointIdx, end: WaypointIdx) {
        self.heap.clear();
        self.data.clear();

        let h_score = self.heuristic.estimate(graph, start, end);
        self.heap.push(HeapItem {
            node: start,
            g_score: 0,
            f_score: h_score,
        });
        self.update_node_data(start, 0, None);
    }

    fn update_node_data(
        &mut self,
        node: WaypointIdx,
        weight: Weight,
        parent: Option<(WaypointIdx, SegmentIdx)>,
    ) {
        let data = self.data.entry(node).or_insert_with(NodeData::new);
        data.weight = weight;
        data.settled = false;
        data.parent = parent;
    }

    fn is_settled(&mut self, node: WaypointIdx) -> bool {
        self.data.entry(node).or_insert_with(NodeData::new).settled
    }

    fn set_settled(&mut self, node: WaypointIdx) {
        if let Some(data) = self.data.get_mut(&node) {
            data.settled = true;
        }
    }

    fn current_shortest_weight(&mut self, node: WaypointIdx) -> Weight {
        self.data.entry(node).or_insert_with(NodeData::new).weight
    }

    fn build_path(&self, end: WaypointIdx, weight: Weight) -> SearchPath {
        let mut nodes = Vec::with_capacity(32);
        let mut segments = Vec::with_capacity(32);

        let mut node = end;
        nodes.push(node);

        while let Some((parent, segment)) = self.data.get(&node).and_then(|data| data.parent) {
            segments.push(segment);
            nodes.push(parent);
            node = parent;
        }

        nodes.reverse();
        segments.reverse();

        SearchPath {
            nodes,
            segments,
            weight,
        }
    }

    /// Cheapest path from `start` to `end` under `weighting`.
    pub fn calc_path(
        &mut self,
        graph: &RoadGraph,
        weighting: &impl Weighting,
        start: WaypointIdx,
        end: WaypointIdx,
    ) -> Result<SearchPath, PlanError> {
        self.init(graph, start, end);

        if start == end {
            return Ok(SearchPath {
                nodes: vec![start],
                segments: Vec::new(),
                weight: 0,
            });
        }

        while let Some(HeapItem { node, g_score, .. }) = self.heap.pop() {
            if self.is_settled(node) {
                continue;
            }

            // A stale heap entry, a cheaper one was already processed
            if g_score > self.current_shortest_weight(node) {
                continue;
            }

            if node == end {
                return Ok(self.build_path(end, g_score));
            }

            for segment_idx in graph.neighbors(node) {
                let segment = graph.segment(segment_idx);
                let adj_node = segment.to_node();

                if self.is_settled(adj_node) {
                    continue;
                }

                let segment_weight = weighting.segment_weight(segment, segment_idx);
                if segment_weight == MAX_WEIGHT {
                    continue;
                }

                let next_weight = g_score + segment_weight;

                if next_weight < self.current_shortest_weight(adj_node) {
                    self.update_node_data(adj_node, next_weight, Some((node, segment_idx)));
                    let h_score = self.heuristic.estimate(graph, adj_node, end);

                    self.heap.push(HeapItem {
                        node: adj_node,
                        g_score: next_weight,
                        f_score: next_weight + h_score,
                    });
                }
            }

            self.set_settled(node);
        }

        Err(PlanError::NoPathFound)
    }
}

impl AStar<HaversineHeuristic> {
    pub fn new() -> AStar<HaversineHeuristic> {
        Self::with_heuristic(HaversineHeuristic::new())
    }
}

impl Default for AStar<HaversineHeuristic> {
    fn default() -> Self {
        AStar::new()
    }
}
