use geo::{Closest, HaversineClosestPoint};
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::energy::VehicleProfile;
use crate::geopoint::GeoPoint;
use crate::graph::RoadGraph;
use crate::plan::augmented_route::AugmentedRoute;
use crate::plan::planner::PlanRequest;
use crate::routing::route_candidate::RouteCandidate;
use crate::routing::weighting::Weighting;
use crate::session::status::SessionStatus;
use crate::stations::index::StationIndex;
use crate::stations::station::StationId;
use crate::units::{KilowattHours, Meters, Soc};

/// One position/battery report from the vehicle. `timestamp_ms` is the
/// client's monotonic clock; updates must arrive in strictly increasing
/// order and stale ones are dropped, not applied last-writer-wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub position: GeoPoint,
    pub soc: Soc,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplanReason {
    Deviated,
    ProjectedShortfall,
    StationUnavailable { fallback: Option<StationId> },
}

/// What one applied (or dropped) update means for the caller.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub status: SessionStatus,
    pub replan: Option<ReplanReason>,
    /// The update was out of order and ignored.
    pub stale: bool,
    /// Present when a replan has installed a new route since the last
    /// update the client saw.
    pub new_route: Option<AugmentedRoute>,
    pub warnings: Vec<String>,
}

struct SessionState {
    route: AugmentedRoute,
    status: SessionStatus,
    position: GeoPoint,
    battery: KilowattHours,
    last_timestamp_ms: Option<u64>,
    deviated_since_ms: Option<u64>,
    /// Cursor into the route's stops: the next one ahead of the vehicle.
    next_stop: usize,
    retries_left: u32,
    route_changed: bool,
    warnings: Vec<String>,
}

/// A live navigation session: one vehicle following one augmented route.
/// Single-owner; concurrent updates serialize on the state lock and apply
/// in monotonic-timestamp order.
pub struct NavigationSession {
    id: Uuid,
    vehicle: VehicleProfile,
    created_at: Timestamp,
    max_retries: u32,
    state: Mutex<SessionState>,
}

impl NavigationSession {
    pub fn new(
        route: AugmentedRoute,
        vehicle: VehicleProfile,
        start_soc: Soc,
        start_position: GeoPoint,
        config: &PlannerConfig,
    ) -> Self {
        let battery = start_soc.of(vehicle.battery_capacity());

        NavigationSession {
            id: Uuid::new_v4(),
            vehicle,
            created_at: Timestamp::now(),
            max_retries: config.replan_retries,
            state: Mutex::new(SessionState {
                route,
                status: SessionStatus::OnTrack,
                position: start_position,
                battery,
                last_timestamp_ms: None,
                deviated_since_ms: None,
                next_stop: 0,
                retries_left: config.replan_retries,
                route_changed: false,
                warnings: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    pub fn current_route(&self) -> AugmentedRoute {
        self.state.lock().route.clone()
    }

    /// Applies one position update and decides what, if anything, has to
    /// happen next. Spawning the actual replan is the manager's job.
    pub fn apply_update(
        &self,
        graph: &RoadGraph,
        weighting: &impl Weighting,
        snapshot: &StationIndex,
        config: &PlannerConfig,
        update: PositionUpdate,
    ) -> UpdateOutcome {
        let mut state = self.state.lock();

        if state.status.is_terminal() {
            return UpdateOutcome {
                status: state.status,
                replan: None,
                stale: true,
                new_route: None,
                warnings: std::mem::take(&mut state.warnings),
            };
        }

        if state
            .last_timestamp_ms
            .is_some_and(|last| update.timestamp_ms <= last)
        {
            debug!(session = %self.id, ts = update.timestamp_ms, "dropping out-of-order update");
            return UpdateOutcome {
                status: state.status,
                replan: None,
                stale: true,
                new_route: None,
                warnings: Vec::new(),
            };
        }

        state.last_timestamp_ms = Some(update.timestamp_ms);
        state.position = update.position;
        state.battery = update.soc.of(self.vehicle.battery_capacity());

        let new_route = state
            .route_changed
            .then(|| state.route.clone());
        state.route_changed = false;

        // While a replan is in flight, keep absorbing updates without
        // re-triggering; the freshest position is picked up on install.
        if state.status == SessionStatus::Rerouting {
            return self.outcome(&mut state, None, new_route);
        }

        let destination = *graph
            .waypoint(state.route.candidate().destination())
            .position();
        if update.position.haversine_distance(&destination) <= config.arrival_radius {
            info!(session = %self.id, "arrived at destination");
            state.status = SessionStatus::Arrived;
            return self.outcome(&mut state, None, new_route);
        }

        let progress = nearest_node_index(graph, state.route.candidate(), &update.position);
        while state
            .route
            .stops()
            .get(state.next_stop)
            .is_some_and(|stop| stop.at_node() < progress)
        {
            state.next_stop += 1;
        }

        // Re-check the next stop's live availability as the vehicle closes in
        if let Some(stop) = state.route.stops().get(state.next_stop) {
            let distance_to_station = update.position.haversine_distance(&stop.station().location);
            if distance_to_station <= config.stop_approach_radius {
                let still_available = snapshot
                    .station_by_id(stop.station().id)
                    .is_some_and(|live| live.is_available());
                if !still_available {
                    warn!(session = %self.id, station = %stop.station().id, "planned station no longer available");
                    let fallback = stop.fallback();
                    state.status = SessionStatus::Rerouting;
                    return self.outcome(
                        &mut state,
                        Some(ReplanReason::StationUnavailable { fallback }),
                        new_route,
                    );
                }
            }
        }

        let off_route = distance_to_route(graph, state.route.candidate(), &update.position);
        if off_route > config.deviation_tolerance {
            match state.deviated_since_ms {
                None => {
                    debug!(session = %self.id, off_route = off_route.value(), "vehicle left the tolerance band");
                    state.deviated_since_ms = Some(update.timestamp_ms);
                    state.status = SessionStatus::Deviated;
                }
                Some(since) => {
                    let deviated_for =
                        SignedDuration::from_millis((update.timestamp_ms - since) as i64);
                    if deviated_for >= config.deviation_debounce {
                        state.status = SessionStatus::Rerouting;
                        return self.outcome(&mut state, Some(ReplanReason::Deviated), new_route);
                    }
                    state.status = SessionStatus::Deviated;
                }
            }
            return self.outcome(&mut state, None, new_route);
        }
        state.deviated_since_ms = None;

        // Projected shortfall: with the battery as reported, can the vehicle
        // still reach the next stop (or the destination) above the reserve?
        let reserve = config.reserve_floor.of(self.vehicle.battery_capacity());
        let target_node = state
            .route
            .stops()
            .get(state.next_stop)
            .map(|stop| stop.at_node())
            .unwrap_or(state.route.candidate().nodes().len() - 1);
        let needed = energy_between_nodes(
            graph,
            weighting,
            &self.vehicle,
            state.route.candidate(),
            progress,
            target_node,
        );

        if state.battery - needed < reserve {
            warn!(
                session = %self.id,
                battery = state.battery.value(),
                needed = needed.value(),
                "projected shortfall before next stop"
            );
            state.status = SessionStatus::Rerouting;
            return self.outcome(&mut state, Some(ReplanReason::ProjectedShortfall), new_route);
        }

        state.status = SessionStatus::OnTrack;
        self.outcome(&mut state, None, new_route)
    }

    fn outcome(
        &self,
        state: &mut SessionState,
        replan: Option<ReplanReason>,
        new_route: Option<AugmentedRoute>,
    ) -> UpdateOutcome {
        UpdateOutcome {
            status: state.status,
            replan,
            stale: false,
            new_route,
            warnings: std::mem::take(&mut state.warnings),
        }
    }

    /// Plan request for a reroute from where the vehicle is right now.
    pub fn replan_request(&self, graph: &RoadGraph, prefer: Option<StationId>) -> PlanRequest {
        let state = self.state.lock();
        let destination = *graph
            .waypoint(state.route.candidate().destination())
            .position();

        PlanRequest {
            source: state.position,
            destination,
            vehicle: self.vehicle.clone(),
            start_soc: Soc::from_energy(state.battery, self.vehicle.battery_capacity()),
            max_routes: None,
            prefer_station: prefer,
        }
    }

    /// Installs a replanned route and puts the session back on track.
    pub fn install_route(&self, route: AugmentedRoute) {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return;
        }

        info!(session = %self.id, stops = route.stops().len(), "installed replanned route");
        state.route = route;
        state.status = SessionStatus::OnTrack;
        state.next_stop = 0;
        state.deviated_since_ms = None;
        state.route_changed = true;
        state.retries_left = self.max_retries;
    }

    /// Burns one replan retry. The session only degrades to Aborted once the
    /// whole retry budget is spent; until then it stays in Rerouting and the
    /// failure is surfaced as a warning.
    pub fn replan_failed(&self, reason: &str) -> SessionStatus {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return state.status;
        }

        state.retries_left = state.retries_left.saturating_sub(1);
        state
            .warnings
            .push(format!("replan failed: {reason}"));

        if state.retries_left == 0 {
            warn!(session = %self.id, "replan retries exhausted, aborting session");
            state.status = SessionStatus::Aborted;
        } else {
            state.status = SessionStatus::Rerouting;
        }

        state.status
    }

    /// Explicit cancellation; allowed from any state.
    pub fn cancel(&self) -> SessionStatus {
        let mut state = self.state.lock();
        state.status = SessionStatus::Aborted;
        state.status
    }
}

fn nearest_node_index(graph: &RoadGraph, candidate: &RouteCandidate, position: &GeoPoint) -> usize {
    let mut best = 0;
    let mut best_distance = Meters::new(f64::MAX);

    for (index, node) in candidate.nodes().iter().enumerate() {
        let distance = position.haversine_distance(graph.waypoint(*node).position());
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }

    best
}

/// Shortest distance from `position` to the planned polyline.
fn distance_to_route(graph: &RoadGraph, candidate: &RouteCandidate, position: &GeoPoint) -> Meters {
    let nodes = candidate.nodes();

    if nodes.len() < 2 {
        return position.haversine_distance(graph.waypoint(nodes[0]).position());
    }

    let point: geo::Point = position.into();

    nodes
        .windows(2)
        .map(|pair| {
            let start = graph.waypoint(pair[0]).position();
            let end = graph.waypoint(pair[1]).position();
            let line = geo::Line::new(geo::Point::from(start), geo::Point::from(end));

            let closest: GeoPoint = match line.haversine_closest_point(&point) {
                Closest::Intersection(p) => p.into(),
                Closest::SinglePoint(p) => p.into(),
                Closest::Indeterminate => *start,
            };

            position.haversine_distance(&closest)
        })
        .min()
        .unwrap_or(Meters::ZERO)
}

fn energy_between_nodes(
    graph: &RoadGraph,
    weighting: &impl Weighting,
    vehicle: &VehicleProfile,
    candidate: &RouteCandidate,
    from_node: usize,
    to_node: usize,
) -> KilowattHours {
    if from_node >= to_node {
        return KilowattHours::ZERO;
    }

    candidate.segments()[from_node..to_node]
        .iter()
        .map(|idx| {
            let segment = graph.segment(*idx);
            vehicle
                .consumption()
                .energy_for_segment(segment, weighting.segment_speed(segment))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::insertion::StopPlanner;
    use crate::routing::astar::AStar;
    use crate::routing::weighting::TravelTimeWeighting;
    use crate::test_graph_utils::test_graph::{
        CorridorFixture, CorridorTown, corridor_graph, corridor_station_index,
    };

    struct Setup {
        fixture: CorridorFixture,
        session: NavigationSession,
        config: PlannerConfig,
    }

    fn setup(start_soc: Soc) -> Setup {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);

        let path = AStar::new()
            .calc_path(
                &fixture.graph,
                &weighting,
                fixture.town(CorridorTown::Valmont),
                fixture.town(CorridorTown::Rocheneuve),
            )
            .unwrap();
        let candidate = RouteCandidate::from_search(&fixture.graph, &weighting, path);
        let stations = corridor_station_index(&fixture);
        let route = StopPlanner::new(&fixture.graph, &weighting, &config).plan(
            candidate,
            start_soc,
            &profile,
            &stations,
        );
        assert!(route.is_feasible());

        let start_position = fixture.town_position(CorridorTown::Valmont);
        let session = NavigationSession::new(route, profile, start_soc, start_position, &config);

        Setup {
            fixture,
            session,
            config,
        }
    }

    fn update_at(setup: &Setup, town: CorridorTown, soc: f64, ts: u64) -> UpdateOutcome {
        let update = PositionUpdate {
            position: setup.fixture.town_position(town),
            soc: Soc::from_percent(soc),
            timestamp_ms: ts,
        };
        setup.session.apply_update(
            &setup.fixture.graph,
            &TravelTimeWeighting::new(),
            &corridor_station_index(&setup.fixture),
            &setup.config,
            update,
        )
    }

    #[test]
    fn should_stay_on_track_while_following_the_route() {
        let setup = setup(Soc::from_percent(30.0));

        let outcome = update_at(&setup, CorridorTown::Brenier, 26.4, 1_000);

        assert_eq!(outcome.status, SessionStatus::OnTrack);
        assert!(outcome.replan.is_none());
        assert!(!outcome.stale);
    }

    #[test]
    fn should_drop_out_of_order_updates() {
        let setup = setup(Soc::from_percent(30.0));

        update_at(&setup, CorridorTown::Brenier, 26.4, 2_000);
        let outcome = update_at(&setup, CorridorTown::Colvert, 25.0, 1_500);

        assert!(outcome.stale);
        assert_eq!(outcome.status, SessionStatus::OnTrack);
    }

    #[test]
    fn should_arrive_within_the_arrival_radius() {
        let setup = setup(Soc::from_percent(95.0));

        let outcome = update_at(&setup, CorridorTown::Rocheneuve, 30.0, 1_000);

        assert_eq!(outcome.status, SessionStatus::Arrived);

        // terminal: further updates are refused
        let after = update_at(&setup, CorridorTown::Serret, 30.0, 2_000);
        assert!(after.stale);
        assert_eq!(after.status, SessionStatus::Arrived);
    }

    #[test]
    fn should_debounce_deviation_before_rerouting() {
        let setup = setup(Soc::from_percent(95.0));
        // well off the corridor
        let off_road = GeoPoint::new(46.1, 7.15);

        let first = setup.session.apply_update(
            &setup.fixture.graph,
            &TravelTimeWeighting::new(),
            &corridor_station_index(&setup.fixture),
            &setup.config,
            PositionUpdate {
                position: off_road,
                soc: Soc::from_percent(90.0),
                timestamp_ms: 1_000,
            },
        );
        assert_eq!(first.status, SessionStatus::Deviated);
        assert!(first.replan.is_none());

        // still deviated but within the debounce window
        let second = setup.session.apply_update(
            &setup.fixture.graph,
            &TravelTimeWeighting::new(),
            &corridor_station_index(&setup.fixture),
            &setup.config,
            PositionUpdate {
                position: off_road,
                soc: Soc::from_percent(89.0),
                timestamp_ms: 6_000,
            },
        );
        assert_eq!(second.status, SessionStatus::Deviated);
        assert!(second.replan.is_none());

        // debounce expired: reroute
        let third = setup.session.apply_update(
            &setup.fixture.graph,
            &TravelTimeWeighting::new(),
            &corridor_station_index(&setup.fixture),
            &setup.config,
            PositionUpdate {
                position: off_road,
                soc: Soc::from_percent(88.0),
                timestamp_ms: 22_000,
            },
        );
        assert_eq!(third.status, SessionStatus::Rerouting);
        assert_eq!(third.replan, Some(ReplanReason::Deviated));
    }

    #[test]
    fn should_recover_from_deviation_when_back_on_route() {
        let setup = setup(Soc::from_percent(95.0));
        let off_road = GeoPoint::new(46.1, 7.15);

        setup.session.apply_update(
            &setup.fixture.graph,
            &TravelTimeWeighting::new(),
            &corridor_station_index(&setup.fixture),
            &setup.config,
            PositionUpdate {
                position: off_road,
                soc: Soc::from_percent(90.0),
                timestamp_ms: 1_000,
            },
        );

        let back = update_at(&setup, CorridorTown::Colvert, 88.0, 5_000);
        assert_eq!(back.status, SessionStatus::OnTrack);
    }

    #[test]
    fn should_reroute_on_projected_shortfall() {
        let setup = setup(Soc::from_percent(30.0));

        // the plan expects ~23% at Colvert; aggressive driving left only 6%,
        // not enough to reach the Ferrand stop above the reserve floor
        let outcome = update_at(&setup, CorridorTown::Colvert, 6.0, 1_000);

        assert_eq!(outcome.status, SessionStatus::Rerouting);
        assert_eq!(outcome.replan, Some(ReplanReason::ProjectedShortfall));
    }

    #[test]
    fn should_reroute_with_fallback_when_station_becomes_occupied() {
        let setup = setup(Soc::from_percent(30.0));

        // the planned stop is station 1 at Ferrand; a fresh snapshot now
        // reports it occupied
        let mut stations = crate::test_graph_utils::test_graph::corridor_stations(&setup.fixture);
        for station in &mut stations {
            if station.id == StationId::new(1) {
                station.availability = crate::stations::Availability::Occupied;
            }
        }
        let snapshot = StationIndex::build(stations);

        let outcome = setup.session.apply_update(
            &setup.fixture.graph,
            &TravelTimeWeighting::new(),
            &snapshot,
            &setup.config,
            PositionUpdate {
                // right at Ferrand, within the approach radius of its station
                position: setup.fixture.town_position(CorridorTown::Ferrand),
                soc: Soc::from_percent(12.0),
                timestamp_ms: 1_000,
            },
        );

        assert_eq!(outcome.status, SessionStatus::Rerouting);
        assert!(matches!(
            outcome.replan,
            Some(ReplanReason::StationUnavailable { .. })
        ));
    }

    #[test]
    fn should_abort_after_replan_retry_budget_is_spent() {
        let setup = setup(Soc::from_percent(30.0));

        for _ in 0..setup.config.replan_retries - 1 {
            assert_eq!(
                setup.session.replan_failed("graph unavailable"),
                SessionStatus::Rerouting
            );
        }
        assert_eq!(
            setup.session.replan_failed("graph unavailable"),
            SessionStatus::Aborted
        );
    }

    #[test]
    fn should_surface_replan_warnings_on_the_next_update() {
        let setup = setup(Soc::from_percent(30.0));

        setup.session.replan_failed("graph unavailable");
        let outcome = update_at(&setup, CorridorTown::Brenier, 26.0, 1_000);

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("graph unavailable"));
    }

    #[test]
    fn should_cancel_from_any_state() {
        let setup = setup(Soc::from_percent(30.0));

        assert_eq!(setup.session.cancel(), SessionStatus::Aborted);

        let outcome = update_at(&setup, CorridorTown::Brenier, 26.0, 1_000);
        assert!(outcome.stale);
        assert_eq!(outcome.status, SessionStatus::Aborted);
    }

    #[test]
    fn should_return_new_route_after_install() {
        let setup = setup(Soc::from_percent(30.0));

        let replacement = setup.session.current_route();
        setup.session.install_route(replacement);

        let outcome = update_at(&setup, CorridorTown::Brenier, 26.0, 1_000);
        assert!(outcome.new_route.is_some());

        // delivered once, then cleared
        let next = update_at(&setup, CorridorTown::Colvert, 24.0, 2_000);
        assert!(next.new_route.is_none());
    }
}
