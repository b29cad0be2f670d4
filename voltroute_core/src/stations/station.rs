use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;
use crate::units::Kilowatts;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StationId(u64);

impl StationId {
    pub const fn new(id: u64) -> Self {
        StationId(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorType {
    Ccs2,
    Chademo,
    Type2,
}

/// Availability as reported by the external station feed. Only ever read
/// from a snapshot taken at request time; staleness is bounded by the
/// snapshot refresh interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Occupied,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    pub id: StationId,
    pub location: GeoPoint,
    pub connector: ConnectorType,
    pub rated_power: Kilowatts,
    pub availability: Availability,
    pub price_per_kwh: f64,
}

impl ChargingStation {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn supports_any(&self, connectors: &[ConnectorType]) -> bool {
        connectors.contains(&self.connector)
    }
}
