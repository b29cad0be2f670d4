use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{Deadline, PlannerConfig};
use crate::energy::VehicleProfile;
use crate::error::PlanError;
use crate::geopoint::GeoPoint;
use crate::graph::RoadGraph;
use crate::plan::augmented_route::AugmentedRoute;
use crate::plan::insertion::StopPlanner;
use crate::plan::ranker::rank;
use crate::routing::candidates::CandidateGenerator;
use crate::routing::weighting::TravelTimeWeighting;
use crate::stations::snapshot::StationSnapshot;
use crate::stations::station::StationId;
use crate::units::Soc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub source: GeoPoint,
    pub destination: GeoPoint,
    pub vehicle: VehicleProfile,
    pub start_soc: Soc,
    #[serde(default)]
    pub max_routes: Option<usize>,
    /// Station to favour on selection ties. Set by replans that follow a
    /// recorded fallback; never set by first-time plan requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_station: Option<StationId>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub routes: Vec<AugmentedRoute>,
    pub recommended_index: Option<usize>,
}

/// The planning facade: candidate generation, stop insertion and ranking
/// over one graph and one station snapshot. Stateless per request and safe
/// to share across threads; concurrent plans only ever read.
pub struct Planner {
    graph: Arc<RoadGraph>,
    stations: Arc<StationSnapshot>,
    weighting: TravelTimeWeighting,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(
        graph: Arc<RoadGraph>,
        stations: Arc<StationSnapshot>,
        config: PlannerConfig,
    ) -> Self {
        Planner {
            graph,
            stations,
            weighting: TravelTimeWeighting::new(),
            config,
        }
    }

    pub fn graph(&self) -> &Arc<RoadGraph> {
        &self.graph
    }

    pub fn stations(&self) -> &Arc<StationSnapshot> {
        &self.stations
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan_route(&self, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
        self.plan_route_cancellable(request, None)
    }

    /// The full pipeline with cooperative cancellation: the flag is checked
    /// between the candidate, insertion and ranking phases, so an abandoned
    /// replan never burns more than one phase of work.
    pub fn plan_route_cancellable(
        &self,
        request: &PlanRequest,
        cancel: Option<&AtomicBool>,
    ) -> Result<PlanResponse, PlanError> {
        request.vehicle.validate()?;

        let deadline = Deadline::after(self.config.plan_timeout);
        let snapshot = self.stations.load();

        let source = self
            .graph
            .nearest_waypoint(&request.source, self.config.snap_radius)
            .ok_or(PlanError::NoPathFound)?;
        let destination = self
            .graph
            .nearest_waypoint(&request.destination, self.config.snap_radius)
            .ok_or(PlanError::NoPathFound)?;

        check_cancelled(cancel)?;

        let k = request.max_routes.unwrap_or(self.config.max_candidates);
        let generator =
            CandidateGenerator::new(&self.graph, &self.weighting, self.config.alternative_penalty);
        let candidates = generator.find_candidates(source, destination, k, Some(&deadline))?;

        check_cancelled(cancel)?;

        let stop_planner = StopPlanner::new(&self.graph, &self.weighting, &self.config)
            .with_preference(request.prefer_station);

        let routes: Vec<AugmentedRoute> = candidates
            .into_par_iter()
            .filter_map(|candidate| {
                if deadline.exceeded() {
                    return None;
                }
                Some(stop_planner.plan(candidate, request.start_soc, &request.vehicle, &snapshot))
            })
            .collect();

        check_cancelled(cancel)?;

        if routes.is_empty() {
            warn!("plan deadline exceeded before any candidate was augmented");
            return Err(PlanError::Timeout);
        }

        if deadline.exceeded() {
            warn!(routes = routes.len(), "plan deadline exceeded, returning partial result");
        }

        let ranked = rank(routes);
        let recommended_index = ranked
            .first()
            .filter(|route| route.is_recommended())
            .map(|_| 0);

        info!(
            routes = ranked.len(),
            feasible = ranked.iter().filter(|route| route.is_feasible()).count(),
            "planned routes"
        );

        Ok(PlanResponse {
            routes: ranked,
            recommended_index,
        })
    }
}

fn check_cancelled(cancel: Option<&AtomicBool>) -> Result<(), PlanError> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(PlanError::Cancelled),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::index::StationIndex;
    use crate::test_graph_utils::test_graph::{CorridorTown, corridor_graph, corridor_stations};

    fn setup(start_soc: Soc) -> (Planner, PlanRequest) {
        let fixture = corridor_graph();
        let source = fixture.town_position(CorridorTown::Valmont);
        let destination = fixture.town_position(CorridorTown::Rocheneuve);
        let stations = corridor_stations(&fixture);

        let planner = Planner::new(
            Arc::new(fixture.graph),
            Arc::new(StationSnapshot::new(StationIndex::build(stations))),
            PlannerConfig::default(),
        );

        let request = PlanRequest {
            source,
            destination,
            vehicle: VehicleProfile::test_profile(40.0, 0.18, 100.0),
            start_soc,
            max_routes: None,
            prefer_station: None,
        };

        (planner, request)
    }

    #[test]
    fn should_plan_and_rank_routes_end_to_end() {
        let (planner, request) = setup(Soc::from_percent(30.0));

        let response = planner.plan_route(&request).unwrap();

        assert!(!response.routes.is_empty());
        assert_eq!(response.recommended_index, Some(0));
        assert!(response.routes[0].is_feasible());
        assert_eq!(response.routes[0].stops().len(), 1);
    }

    #[test]
    fn should_reject_invalid_profile_before_planning() {
        let (planner, mut request) = setup(Soc::from_percent(50.0));
        request.vehicle = VehicleProfile::test_profile(0.0, 0.18, 100.0);

        assert!(matches!(
            planner.plan_route(&request),
            Err(PlanError::InvalidVehicleProfile(_))
        ));
    }

    #[test]
    fn should_fail_when_no_waypoint_is_in_snap_range() {
        let (planner, mut request) = setup(Soc::from_percent(50.0));
        request.source = GeoPoint::new(40.0, 2.0);

        assert!(matches!(
            planner.plan_route(&request),
            Err(PlanError::NoPathFound)
        ));
    }

    #[test]
    fn should_return_cancelled_when_flag_is_set() {
        let (planner, request) = setup(Soc::from_percent(50.0));

        let cancel = AtomicBool::new(true);
        let result = planner.plan_route_cancellable(&request, Some(&cancel));

        assert!(matches!(result, Err(PlanError::Cancelled)));
    }

    #[test]
    fn should_produce_identical_responses_for_identical_requests() {
        let (planner, request) = setup(Soc::from_percent(30.0));

        let first = planner.plan_route(&request).unwrap();
        let second = planner.plan_route(&request).unwrap();

        assert_eq!(first.routes, second.routes);
        assert_eq!(first.recommended_index, second.recommended_index);
    }
}
