use std::cmp::Ordering;

use jiff::SignedDuration;
use tracing::debug;

use crate::config::PlannerConfig;
use crate::energy::charging::dwell_to_reach;
use crate::energy::vehicle_profile::VehicleProfile;
use crate::graph::RoadGraph;
use crate::plan::augmented_route::AugmentedRoute;
use crate::plan::charge_stop::ChargeStop;
use crate::routing::route_candidate::RouteCandidate;
use crate::routing::weighting::Weighting;
use crate::stations::index::StationIndex;
use crate::stations::station::{Availability, ChargingStation, StationId};
use crate::units::{KilowattHours, Meters, Soc};

/// A station considered for one stop, with the cost of getting to it.
struct StopCandidate {
    station: ChargingStation,
    node_index: usize,
    detour_distance: Meters,
}

impl StopCandidate {
    /// Selection order: shortest detour, then highest rated power, then
    /// lowest price.
    fn better_than(&self, other: &StopCandidate) -> bool {
        let ordering = self
            .detour_distance
            .cmp(&other.detour_distance)
            .then_with(|| {
                other
                    .station
                    .rated_power
                    .partial_cmp(&self.station.rated_power)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| {
                self.station
                    .price_per_kwh
                    .partial_cmp(&other.station.price_per_kwh)
                    .unwrap_or(Ordering::Equal)
            });
        ordering == Ordering::Less
    }
}

struct StopSelection {
    primary: StopCandidate,
    fallback: Option<ChargingStation>,
}

/// The charging-stop insertion planner. Walks a candidate's segments
/// projecting the battery level and inserts the minimal set of charging
/// stops needed to keep the projection above the reserve floor.
pub struct StopPlanner<'a, W: Weighting> {
    graph: &'a RoadGraph,
    weighting: &'a W,
    config: &'a PlannerConfig,
    /// Station favoured on selection ties, set when a replan follows a
    /// recorded fallback.
    prefer: Option<StationId>,
}

impl<'a, W: Weighting> StopPlanner<'a, W> {
    pub fn new(graph: &'a RoadGraph, weighting: &'a W, config: &'a PlannerConfig) -> Self {
        StopPlanner {
            graph,
            weighting,
            config,
            prefer: None,
        }
    }

    pub fn with_preference(mut self, prefer: Option<StationId>) -> Self {
        self.prefer = prefer;
        self
    }

    /// Augments `candidate` with charging stops so that the battery never
    /// drops below the reserve floor. When no compatible station is
    /// reachable before the floor would be breached, the route is returned
    /// marked infeasible instead of being discarded.
    pub fn plan(
        &self,
        candidate: RouteCandidate,
        start_soc: Soc,
        profile: &VehicleProfile,
        stations: &StationIndex,
    ) -> AugmentedRoute {
        let capacity = profile.battery_capacity();
        let reserve = self.config.reserve_floor.of(capacity);

        let segment_costs = self.segment_costs(&candidate, profile);
        let total_base_energy: KilowattHours = segment_costs.iter().copied().sum();

        let mut stops: Vec<ChargeStop> = Vec::new();
        let mut feasible = true;

        // battery on arrival at each node walked so far
        let mut battery_at: Vec<KilowattHours> = Vec::with_capacity(candidate.nodes().len());
        battery_at.push(start_soc.of(capacity));

        // dwell and detour time accumulated ahead of the current position
        let mut extra_time = SignedDuration::ZERO;
        let mut detour_energy = KilowattHours::ZERO;
        let mut charging_cost = 0.0;
        let mut last_stop_node: Option<usize> = None;

        let mut i = 0;
        while i < candidate.segments().len() {
            let cost = segment_costs[i];
            let after = battery_at[i] - cost;

            if feasible && after < reserve {
                let selection = self.select_stop(
                    &candidate,
                    i,
                    &battery_at,
                    reserve,
                    profile,
                    stations,
                    last_stop_node,
                );

                match selection {
                    Some(StopSelection { primary, fallback }) => {
                        let j = primary.node_index;
                        let leg_energy = profile
                            .consumption()
                            .energy_for_distance(primary.detour_distance, self.config.detour_speed);
                        let leg_time = primary.detour_distance / self.config.detour_speed;

                        let arrival_battery = battery_at[j] - leg_energy;
                        let remaining = (total_base_energy
                            - self.base_energy_to_node(&segment_costs, j))
                            + leg_energy;
                        let target = (remaining + reserve).min(capacity);

                        let (dwell, departure_battery) = dwell_to_reach(
                            &primary.station,
                            arrival_battery,
                            target,
                            profile,
                            self.config.charge_step,
                            self.config.max_dwell,
                        );

                        if departure_battery <= arrival_battery {
                            // the station cannot actually charge this vehicle
                            debug!(station = %primary.station.id, "selected station added no energy");
                            feasible = false;
                            continue;
                        }

                        let arrival_offset = candidate.time_at_node(j) + extra_time + leg_time;

                        charging_cost += (departure_battery - arrival_battery).value()
                            * primary.station.price_per_kwh;
                        extra_time += leg_time + dwell + leg_time;
                        detour_energy += leg_energy + leg_energy;

                        stops.push(ChargeStop::new(
                            primary.station,
                            j,
                            primary.detour_distance,
                            arrival_battery,
                            departure_battery,
                            dwell,
                            arrival_offset,
                            fallback.map(|station| station.id),
                        ));

                        // resume the walk from the stop node with the
                        // post-charge battery, return leg deducted
                        battery_at.truncate(j + 1);
                        battery_at[j] = departure_battery - leg_energy;
                        last_stop_node = Some(j);
                        i = j;
                        continue;
                    }
                    None => {
                        debug!(segment = i, "no reachable compatible station, route infeasible");
                        feasible = false;
                        // keep walking to produce totals for the marked route
                    }
                }
            }

            battery_at.push(after);
            i += 1;
        }

        let arrival_battery = *battery_at.last().unwrap();
        let total_time = candidate.total_time() + extra_time;
        let total_energy = total_base_energy + detour_energy;

        AugmentedRoute::new(
            candidate,
            stops,
            total_time,
            total_energy,
            charging_cost,
            arrival_battery,
            feasible,
        )
    }

    fn segment_costs(
        &self,
        candidate: &RouteCandidate,
        profile: &VehicleProfile,
    ) -> Vec<KilowattHours> {
        candidate
            .segments()
            .iter()
            .map(|idx| {
                let segment = self.graph.segment(*idx);
                profile
                    .consumption()
                    .energy_for_segment(segment, self.weighting.segment_speed(segment))
            })
            .collect()
    }

    fn base_energy_to_node(&self, segment_costs: &[KilowattHours], node: usize) -> KilowattHours {
        segment_costs[..node].iter().copied().sum()
    }

    /// Scans back from the shortfall towards the previous stop, looking for
    /// the furthest node with a compatible station inside the corridor that
    /// is still reachable above the reserve floor. Occupied stations are
    /// excluded from selection but the best one seen is kept as a fallback.
    #[allow(clippy::too_many_arguments)]
    fn select_stop(
        &self,
        candidate: &RouteCandidate,
        shortfall_segment: usize,
        battery_at: &[KilowattHours],
        reserve: KilowattHours,
        profile: &VehicleProfile,
        stations: &StationIndex,
        last_stop_node: Option<usize>,
    ) -> Option<StopSelection> {
        let lower = last_stop_node.map_or(0, |node| node + 1);
        let mut fallback: Option<StopCandidate> = None;

        for j in (lower..=shortfall_segment).rev() {
            let point = self.graph.waypoint(candidate.nodes()[j]).position();
            let nearby =
                stations.stations_near(point, self.config.corridor_radius, profile.connectors());

            let mut best: Option<StopCandidate> = None;

            for station in nearby {
                let detour_distance = point.haversine_distance(&station.location);
                let approach_energy = profile
                    .consumption()
                    .energy_for_distance(detour_distance, self.config.detour_speed);

                if battery_at[j] - approach_energy < reserve {
                    continue;
                }

                let stop_candidate = StopCandidate {
                    station: station.clone(),
                    node_index: j,
                    detour_distance,
                };

                match station.availability {
                    Availability::Available => {
                        if self.prefer == Some(station.id) {
                            best = Some(stop_candidate);
                            break;
                        }
                        if best
                            .as_ref()
                            .is_none_or(|current| stop_candidate.better_than(current))
                        {
                            best = Some(stop_candidate);
                        }
                    }
                    Availability::Occupied => {
                        if fallback
                            .as_ref()
                            .is_none_or(|current| stop_candidate.better_than(current))
                        {
                            fallback = Some(stop_candidate);
                        }
                    }
                    Availability::Offline => {}
                }
            }

            if let Some(primary) = best {
                return Some(StopSelection {
                    primary,
                    fallback: fallback.map(|candidate| candidate.station),
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::astar::AStar;
    use crate::routing::weighting::TravelTimeWeighting;
    use crate::stations::station::{ConnectorType, StationId};
    use crate::test_graph_utils::test_graph::{
        CorridorFixture, CorridorTown, corridor_graph, corridor_station_index, station_at,
    };
    use crate::units::Kilowatts;

    fn candidate_between(
        fixture: &CorridorFixture,
        from: CorridorTown,
        to: CorridorTown,
    ) -> RouteCandidate {
        let weighting = TravelTimeWeighting::new();
        let path = AStar::new()
            .calc_path(
                &fixture.graph,
                &weighting,
                fixture.town(from),
                fixture.town(to),
            )
            .unwrap();
        RouteCandidate::from_search(&fixture.graph, &weighting, path)
    }

    /// Replays the planned route with the same energy model and returns the
    /// lowest battery level seen anywhere along it.
    fn lowest_battery(
        fixture: &CorridorFixture,
        route: &AugmentedRoute,
        start_soc: Soc,
        profile: &VehicleProfile,
        config: &PlannerConfig,
    ) -> KilowattHours {
        let weighting = TravelTimeWeighting::new();
        let mut battery = start_soc.of(profile.battery_capacity());
        let mut lowest = battery;
        let mut stops = route.stops().iter().peekable();

        for (i, segment_idx) in route.candidate().segments().iter().enumerate() {
            while let Some(stop) = stops.peek() {
                if stop.at_node() != i {
                    break;
                }
                let leg = profile
                    .consumption()
                    .energy_for_distance(stop.detour_distance(), config.detour_speed);
                battery -= leg;
                lowest = lowest.min(battery);
                battery = stop.departure_battery() - leg;
                stops.next();
            }

            let segment = fixture.graph.segment(*segment_idx);
            battery -= profile
                .consumption()
                .energy_for_segment(segment, weighting.segment_speed(segment));
            lowest = lowest.min(battery);
        }

        lowest
    }

    #[test]
    fn should_insert_one_stop_on_long_trip_with_low_battery() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        let stations = corridor_station_index(&fixture);
        // 144 km trip starting at 30%: 12 kWh on board, ~26 kWh needed
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);

        let route = planner.plan(candidate, Soc::from_percent(30.0), &profile, &stations);

        assert!(route.is_feasible());
        assert_eq!(route.stops().len(), 1);
        // the stop lands at Ferrand, the furthest compatible site before the
        // projected shortfall at Hautvelle
        assert_eq!(route.stops()[0].station().id, StationId::new(1));
        assert!(route.arrival_battery() >= config.reserve_floor.of(profile.battery_capacity()));
    }

    #[test]
    fn should_not_stop_on_short_trip_with_high_battery() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        let stations = corridor_station_index(&fixture);
        // 56 km at 95%: no charge needed
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Hautvelle);

        let route = planner.plan(candidate, Soc::from_percent(95.0), &profile, &stations);

        assert!(route.is_feasible());
        assert!(route.stops().is_empty());
    }

    #[test]
    fn should_keep_battery_above_reserve_floor_everywhere() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        let stations = corridor_station_index(&fixture);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);
        let start_soc = Soc::from_percent(30.0);

        let route = planner.plan(candidate, start_soc, &profile, &stations);

        assert!(route.is_feasible());
        let reserve = config.reserve_floor.of(profile.battery_capacity());
        let lowest = lowest_battery(&fixture, &route, start_soc, &profile, &config);
        assert!(
            lowest >= reserve - KilowattHours::new(1e-9),
            "battery dipped to {:?} below reserve {:?}",
            lowest,
            reserve
        );
    }

    #[test]
    fn should_charge_only_what_the_rest_of_the_trip_needs() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        let stations = corridor_station_index(&fixture);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);

        let route = planner.plan(candidate, Soc::from_percent(30.0), &profile, &stations);

        // no blind charge-to-full: the battery leaves the stop well under
        // capacity because the remaining 104 km only need ~19 kWh
        let stop = &route.stops()[0];
        assert!(stop.departure_battery() < KilowattHours::new(25.0));
        assert!(stop.dwell() > SignedDuration::ZERO);
    }

    #[test]
    fn should_mark_route_infeasible_without_compatible_stations() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        // CHAdeMO-only vehicle: the only CHAdeMO site sits at Pradel, far
        // beyond the first shortfall
        let profile = VehicleProfile::new(
            KilowattHours::new(40.0),
            crate::energy::ConsumptionCurve::flat(0.18),
            crate::energy::ChargingCurve::constant(Kilowatts::new(100.0)),
            vec![ConnectorType::Chademo],
        );
        let stations = corridor_station_index(&fixture);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);

        let route = planner.plan(candidate, Soc::from_percent(30.0), &profile, &stations);

        assert!(!route.is_feasible());
        assert!(route.stops().is_empty());
        // the marked route still reports totals
        assert!(route.total_time() > SignedDuration::ZERO);
    }

    #[test]
    fn should_record_occupied_station_as_fallback() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        // two sites at Ferrand: a free 50 kW charger and an occupied fast one
        let stations = StationIndex::build(vec![
            station_at(
                10,
                fixture.town_position(CorridorTown::Ferrand),
                ConnectorType::Ccs2,
                50.0,
                Availability::Available,
                0.40,
            ),
            station_at(
                11,
                fixture.town_position(CorridorTown::Ferrand),
                ConnectorType::Ccs2,
                150.0,
                Availability::Occupied,
                0.50,
            ),
        ]);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);

        let route = planner.plan(candidate, Soc::from_percent(30.0), &profile, &stations);

        assert!(route.is_feasible());
        assert_eq!(route.stops()[0].station().id, StationId::new(10));
        assert_eq!(route.stops()[0].fallback(), Some(StationId::new(11)));
    }

    #[test]
    fn should_prefer_higher_power_on_equal_detour() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        // identical location, so the detour ties and power must decide
        let stations = StationIndex::build(vec![
            station_at(
                20,
                fixture.town_position(CorridorTown::Ferrand),
                ConnectorType::Ccs2,
                50.0,
                Availability::Available,
                0.40,
            ),
            station_at(
                21,
                fixture.town_position(CorridorTown::Ferrand),
                ConnectorType::Ccs2,
                150.0,
                Availability::Available,
                0.40,
            ),
        ]);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);

        let route = planner.plan(candidate, Soc::from_percent(30.0), &profile, &stations);

        assert_eq!(route.stops()[0].station().id, StationId::new(21));
    }

    #[test]
    fn should_return_trivial_route_for_zero_length_candidate() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        let stations = corridor_station_index(&fixture);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Valmont);

        let route = planner.plan(candidate, Soc::from_percent(10.0), &profile, &stations);

        assert!(route.is_feasible());
        assert!(route.stops().is_empty());
        assert_eq!(route.total_time(), SignedDuration::ZERO);
    }

    #[test]
    fn should_order_stops_by_position_and_arrival_time() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        // a small battery forces several stops on the long trip
        let profile = VehicleProfile::test_profile(15.0, 0.18, 100.0);
        let stations = corridor_station_index(&fixture);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);

        let route = planner.plan(candidate, Soc::from_percent(80.0), &profile, &stations);

        assert!(route.is_feasible());
        assert!(route.stops().len() >= 2);

        for pair in route.stops().windows(2) {
            assert!(pair[0].at_node() < pair[1].at_node());
            assert!(pair[0].arrival_offset() < pair[1].arrival_offset());
        }
    }

    #[test]
    fn should_produce_identical_routes_for_identical_inputs() {
        let fixture = corridor_graph();
        let config = PlannerConfig::default();
        let weighting = TravelTimeWeighting::new();
        let planner = StopPlanner::new(&fixture.graph, &weighting, &config);

        let profile = VehicleProfile::test_profile(40.0, 0.18, 100.0);
        let stations = corridor_station_index(&fixture);
        let candidate = candidate_between(&fixture, CorridorTown::Valmont, CorridorTown::Rocheneuve);

        let first = planner.plan(candidate.clone(), Soc::from_percent(30.0), &profile, &stations);
        let second = planner.plan(candidate, Soc::from_percent(30.0), &profile, &stations);

        assert_eq!(first, second);
    }
}
