#[cfg(test)]
pub mod test_graph {

    use crate::geopoint::GeoPoint;
    use crate::graph::{RoadClass, RoadGraph, WaypointIdx};
    use crate::stations::{Availability, ChargingStation, ConnectorType, StationId, StationIndex};
    use crate::units::{Kilowatts, Meters};

    /// Towns along the valley road, west to east, 8 km apart.
    #[derive(Debug, Clone, Copy)]
    pub enum CorridorTown {
        Valmont = 0,
        Brenier = 1,
        Colvert = 2,
        Dunefort = 3,
        Esclat = 4,
        Ferrand = 5,
        Giraud = 6,
        Hautvelle = 7,
        Islette = 8,
        Jourdain = 9,
        Kervalle = 10,
        Lormont = 11,
        Mirabel = 12,
        Noyelle = 13,
        Orvanne = 14,
        Pradel = 15,
        Quissac = 16,
        Serret = 17,
        Rocheneuve = 18,
    }

    pub const TOWN_SPACING: Meters = Meters::new(8_000.0);

    /// A 144 km valley corridor with a slower mountain-pass alternative
    /// between Dunefort and Hautvelle, plus one node disconnected from
    /// everything.
    pub struct CorridorFixture {
        pub graph: RoadGraph,
        pub towns: Vec<WaypointIdx>,
        pub pass_nodes: Vec<WaypointIdx>,
        pub isolated: WaypointIdx,
    }

    impl CorridorFixture {
        pub fn town(&self, town: CorridorTown) -> WaypointIdx {
            self.towns[town as usize]
        }

        pub fn town_position(&self, town: CorridorTown) -> GeoPoint {
            *self.graph.waypoint(self.town(town)).position()
        }
    }

    pub fn corridor_graph() -> CorridorFixture {
        let mut graph = RoadGraph::new();

        // ~7.7 km of real spacing per 0.1 degree of longitude at this
        // latitude; the declared segment distance of 8 km stays above the
        // straight-line distance, keeping the haversine heuristic admissible
        let towns: Vec<WaypointIdx> = (0..19)
            .map(|i| graph.add_waypoint(GeoPoint::new(46.0, 7.0 + 0.1 * i as f64)))
            .collect();

        for pair in towns.windows(2) {
            graph.add_two_way(pair[0], pair[1], TOWN_SPACING, Meters::ZERO, RoadClass::Primary);
        }

        // Mountain pass: longer, slower, with real climb and descent
        let pass_a = graph.add_waypoint(GeoPoint::new(46.08, 7.35));
        let pass_b = graph.add_waypoint(GeoPoint::new(46.08, 7.45));
        graph.add_two_way(
            towns[CorridorTown::Dunefort as usize],
            pass_a,
            Meters::new(12_000.0),
            Meters::new(600.0),
            RoadClass::Secondary,
        );
        graph.add_two_way(
            pass_a,
            pass_b,
            Meters::new(10_000.0),
            Meters::new(200.0),
            RoadClass::Secondary,
        );
        graph.add_two_way(
            pass_b,
            towns[CorridorTown::Hautvelle as usize],
            Meters::new(12_000.0),
            Meters::new(-800.0),
            RoadClass::Secondary,
        );

        let isolated = graph.add_waypoint(GeoPoint::new(47.5, 9.5));

        CorridorFixture {
            graph,
            towns,
            pass_nodes: vec![pass_a, pass_b],
            isolated,
        }
    }

    pub fn station_at(
        id: u64,
        town_position: GeoPoint,
        connector: ConnectorType,
        rated_power_kw: f64,
        availability: Availability,
        price_per_kwh: f64,
    ) -> ChargingStation {
        // just off the road, a ~220 m detour
        let location = GeoPoint::new(town_position.lat + 0.002, town_position.lon);
        ChargingStation {
            id: StationId::new(id),
            location,
            connector,
            rated_power: Kilowatts::new(rated_power_kw),
            availability,
            price_per_kwh,
        }
    }

    /// The station set used by most planning tests: CCS chargers at Esclat,
    /// Ferrand and Jourdain, a destination-charger at Mirabel, an occupied
    /// fast charger at Hautvelle and a CHAdeMO site at Pradel.
    pub fn corridor_stations(fixture: &CorridorFixture) -> Vec<ChargingStation> {
        vec![
            station_at(
                6,
                fixture.town_position(CorridorTown::Esclat),
                ConnectorType::Ccs2,
                50.0,
                Availability::Available,
                0.42,
            ),
            station_at(
                1,
                fixture.town_position(CorridorTown::Ferrand),
                ConnectorType::Ccs2,
                150.0,
                Availability::Available,
                0.45,
            ),
            station_at(
                2,
                fixture.town_position(CorridorTown::Jourdain),
                ConnectorType::Ccs2,
                50.0,
                Availability::Available,
                0.40,
            ),
            station_at(
                3,
                fixture.town_position(CorridorTown::Mirabel),
                ConnectorType::Type2,
                22.0,
                Availability::Available,
                0.35,
            ),
            station_at(
                4,
                fixture.town_position(CorridorTown::Hautvelle),
                ConnectorType::Ccs2,
                150.0,
                Availability::Occupied,
                0.50,
            ),
            station_at(
                5,
                fixture.town_position(CorridorTown::Pradel),
                ConnectorType::Chademo,
                50.0,
                Availability::Available,
                0.38,
            ),
        ]
    }

    pub fn corridor_station_index(fixture: &CorridorFixture) -> StationIndex {
        StationIndex::build(corridor_stations(fixture))
    }
}
