use crate::stations::station::ChargingStation;

/// Source of station records with live availability. Implementations poll
/// whatever upstream exists (a file, an HTTP feed); the planner only ever
/// consumes the snapshots built from the returned lists.
pub trait StationFeed: Send + Sync {
    fn fetch(&self) -> anyhow::Result<Vec<ChargingStation>>;
}

/// Fixed in-memory feed.
pub struct StaticStationFeed {
    stations: Vec<ChargingStation>,
}

impl StaticStationFeed {
    pub fn new(stations: Vec<ChargingStation>) -> Self {
        StaticStationFeed { stations }
    }
}

impl StationFeed for StaticStationFeed {
    fn fetch(&self) -> anyhow::Result<Vec<ChargingStation>> {
        Ok(self.stations.clone())
    }
}
