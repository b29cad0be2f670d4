use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::stations::feed::StationFeed;
use crate::stations::index::StationIndex;

/// Holder for the current station snapshot. Refreshes build a whole new
/// index off-lock and swap the Arc, so readers never block writers and never
/// observe a torn snapshot.
pub struct StationSnapshot {
    current: RwLock<Arc<StationIndex>>,
}

impl StationSnapshot {
    pub fn new(index: StationIndex) -> Self {
        StationSnapshot {
            current: RwLock::new(Arc::new(index)),
        }
    }

    pub fn empty() -> Self {
        StationSnapshot::new(StationIndex::empty())
    }

    /// The most recent completed snapshot. Callers keep the Arc for the
    /// whole request so one plan only ever sees one snapshot.
    pub fn load(&self) -> Arc<StationIndex> {
        Arc::clone(&self.current.read())
    }

    pub fn swap(&self, index: StationIndex) {
        *self.current.write() = Arc::new(index);
    }

    /// Polls the feed and swaps in a fresh index. A failed poll keeps the
    /// previous snapshot in place.
    pub fn refresh_from(&self, feed: &dyn StationFeed) {
        match feed.fetch() {
            Ok(stations) => {
                let count = stations.len();
                self.swap(StationIndex::build(stations));
                info!(stations = count, "refreshed station snapshot");
            }
            Err(error) => {
                warn!(%error, "station feed poll failed, keeping previous snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geopoint::GeoPoint;
    use crate::stations::station::{Availability, ChargingStation, ConnectorType, StationId};
    use crate::units::Kilowatts;

    fn station(id: u64) -> ChargingStation {
        ChargingStation {
            id: StationId::new(id),
            location: GeoPoint::new(46.0, 7.0),
            connector: ConnectorType::Ccs2,
            rated_power: Kilowatts::new(50.0),
            availability: Availability::Available,
            price_per_kwh: 0.4,
        }
    }

    #[test]
    fn should_keep_old_snapshot_alive_across_swap() {
        let holder = StationSnapshot::new(StationIndex::build(vec![station(1)]));

        let before = holder.load();
        holder.swap(StationIndex::build(vec![station(1), station(2)]));
        let after = holder.load();

        // a reader holding the old Arc still sees the snapshot it started with
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn should_keep_previous_snapshot_when_feed_fails() {
        struct FailingFeed;
        impl StationFeed for FailingFeed {
            fn fetch(&self) -> anyhow::Result<Vec<ChargingStation>> {
                anyhow::bail!("feed unreachable")
            }
        }

        let holder = StationSnapshot::new(StationIndex::build(vec![station(1)]));
        holder.refresh_from(&FailingFeed);

        assert_eq!(holder.load().len(), 1);
    }
}
