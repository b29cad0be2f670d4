pub mod astar;
pub mod astar_heuristic;
pub mod candidates;
pub mod dijkstra;
pub mod route_candidate;
pub mod weighting;

pub use astar::AStar;
pub use candidates::CandidateGenerator;
pub use route_candidate::RouteCandidate;
pub use weighting::{TravelTimeWeighting, Weight, Weighting};
