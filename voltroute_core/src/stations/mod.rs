pub mod feed;
pub mod index;
pub mod snapshot;
pub mod station;

pub use feed::{StationFeed, StaticStationFeed};
pub use index::StationIndex;
pub use snapshot::StationSnapshot;
pub use station::{Availability, ChargingStation, ConnectorType, StationId};
