use tracing::debug;

use crate::config::Deadline;
use crate::error::PlanError;
use crate::graph::{RoadGraph, WaypointIdx};
use crate::routing::astar::AStar;
use crate::routing::route_candidate::RouteCandidate;
use crate::routing::weighting::{PenalizedWeighting, Weighting};

/// Produces up to `k` distinct route candidates between two nodes. The first
/// is the shortest path; alternatives come from re-running the search with
/// the segments of earlier candidates penalized.
pub struct CandidateGenerator<'a, W: Weighting> {
    graph: &'a RoadGraph,
    weighting: &'a W,
    penalty_factor: f64,
}

impl<'a, W: Weighting> CandidateGenerator<'a, W> {
    pub fn new(graph: &'a RoadGraph, weighting: &'a W, penalty_factor: f64) -> Self {
        CandidateGenerator {
            graph,
            weighting,
            penalty_factor,
        }
    }

    /// Up to `k` candidates ordered by ascending base distance. Fails with
    /// `NoPathFound` only when not even one path exists.
    pub fn find_candidates(
        &self,
        source: WaypointIdx,
        destination: WaypointIdx,
        k: usize,
        deadline: Option<&Deadline>,
    ) -> Result<Vec<RouteCandidate>, PlanError> {
        let mut astar = AStar::new();
        let mut penalized = PenalizedWeighting::new(self.weighting, self.penalty_factor);
        let mut candidates: Vec<RouteCandidate> = Vec::with_capacity(k);

        for round in 0..k.max(1) {
            if round > 0 && deadline.is_some_and(|deadline| deadline.exceeded()) {
                debug!(found = candidates.len(), "candidate search hit the deadline");
                break;
            }

            let path = match astar.calc_path(self.graph, &penalized, source, destination) {
                Ok(path) => path,
                // the first search failing means the graph is disconnected;
                // later failures just mean no more alternatives exist
                Err(PlanError::NoPathFound) if round > 0 => break,
                Err(error) => return Err(error),
            };

            let duplicate = candidates
                .iter()
                .any(|candidate| candidate.segments() == path.segments);
            if duplicate {
                break;
            }

            penalized.penalize(&path.segments);
            candidates.push(RouteCandidate::from_search(self.graph, self.weighting, path));
        }

        candidates.sort_by(|a, b| a.total_distance().cmp(&b.total_distance()));

        Ok(candidates)
    }
}
