use rstar::primitives::GeomWithData;
use rstar::{RStarInsertionStrategy, RTree, RTreeParams};

use crate::geopoint::GeoPoint;
use crate::stations::station::{ChargingStation, ConnectorType, StationId};
use crate::units::Meters;

type StationObject = GeomWithData<GeoPoint, usize>;

struct StationTreeParams;

impl RTreeParams for StationTreeParams {
    type DefaultInsertionStrategy = RStarInsertionStrategy;

    const MAX_SIZE: usize = 64;
    const MIN_SIZE: usize = 28;
    const REINSERTION_COUNT: usize = 5;
}

/// Immutable spatial index over one station snapshot. Rebuilt wholesale on
/// every feed refresh and swapped in atomically; queries never see a
/// partially refreshed index.
pub struct StationIndex {
    stations: Vec<ChargingStation>,
    tree: RTree<StationObject, StationTreeParams>,
}

impl StationIndex {
    pub fn build(stations: Vec<ChargingStation>) -> StationIndex {
        let tree = RTree::bulk_load_with_params(
            stations
                .iter()
                .enumerate()
                .map(|(i, station)| StationObject::new(station.location, i))
                .collect(),
        );

        StationIndex { stations, tree }
    }

    pub fn empty() -> StationIndex {
        StationIndex::build(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[ChargingStation] {
        &self.stations
    }

    pub fn station_by_id(&self, id: StationId) -> Option<&ChargingStation> {
        self.stations.iter().find(|station| station.id == id)
    }

    /// Stations within `radius` of `point` that offer one of the requested
    /// connectors, closest first. Availability is not filtered here; the
    /// planner needs Occupied stations too, as replan fallbacks.
    pub fn stations_near(
        &self,
        point: &GeoPoint,
        radius: Meters,
        connectors: &[ConnectorType],
    ) -> Vec<&ChargingStation> {
        let bbox = point.bounding_box(radius);

        let mut hits: Vec<(Meters, &ChargingStation)> = self
            .tree
            .locate_in_envelope(&bbox)
            .map(|object| &self.stations[object.data])
            .filter(|station| station.supports_any(connectors))
            .filter_map(|station| {
                let distance = point.haversine_distance(&station.location);
                (distance <= radius).then_some((distance, station))
            })
            .collect();

        hits.sort_by(|a, b| a.0.cmp(&b.0));
        hits.into_iter().map(|(_, station)| station).collect()
    }
}
