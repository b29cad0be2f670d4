use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::stations::{ChargingStation, StationId};
use crate::units::{KilowattHours, Meters};

/// A charging stop inserted into a route candidate. Carries the station
/// record as seen in the planning snapshot, so the stop stays meaningful
/// even after the live index moves on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeStop {
    station: ChargingStation,
    /// Index into the candidate's node sequence where the vehicle leaves the
    /// route for this stop.
    at_node: usize,
    /// One-way off-route distance to the station.
    detour_distance: Meters,
    arrival_battery: KilowattHours,
    departure_battery: KilowattHours,
    dwell: SignedDuration,
    /// Time from departure at the source until plugging in, driving and
    /// earlier stops included.
    arrival_offset: SignedDuration,
    /// Best Occupied station seen during selection, recorded for replanning
    /// in case the primary is still taken on arrival.
    fallback: Option<StationId>,
}

impl ChargeStop {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        station: ChargingStation,
        at_node: usize,
        detour_distance: Meters,
        arrival_battery: KilowattHours,
        departure_battery: KilowattHours,
        dwell: SignedDuration,
        arrival_offset: SignedDuration,
        fallback: Option<StationId>,
    ) -> Self {
        ChargeStop {
            station,
            at_node,
            detour_distance,
            arrival_battery,
            departure_battery,
            dwell,
            arrival_offset,
            fallback,
        }
    }

    pub fn station(&self) -> &ChargingStation {
        &self.station
    }

    pub fn at_node(&self) -> usize {
        self.at_node
    }

    pub fn detour_distance(&self) -> Meters {
        self.detour_distance
    }

    pub fn arrival_battery(&self) -> KilowattHours {
        self.arrival_battery
    }

    pub fn departure_battery(&self) -> KilowattHours {
        self.departure_battery
    }

    pub fn energy_added(&self) -> KilowattHours {
        self.departure_battery - self.arrival_battery
    }

    pub fn dwell(&self) -> SignedDuration {
        self.dwell
    }

    pub fn arrival_offset(&self) -> SignedDuration {
        self.arrival_offset
    }

    pub fn fallback(&self) -> Option<StationId> {
        self.fallback
    }
}
