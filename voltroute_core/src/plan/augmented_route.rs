use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::plan::charge_stop::ChargeStop;
use crate::routing::RouteCandidate;
use crate::units::KilowattHours;

/// A route candidate with its charging stops and derived totals. This is the
/// unit returned to clients; infeasible routes are returned too, marked, so
/// the caller can explain why a trip does not work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedRoute {
    candidate: RouteCandidate,
    stops: Vec<ChargeStop>,
    total_time: SignedDuration,
    total_energy: KilowattHours,
    /// Money spent charging along the way.
    charging_cost: f64,
    /// Battery left on arrival, negative when the route is infeasible.
    arrival_battery: KilowattHours,
    feasible: bool,
    recommended: bool,
}

impl AugmentedRoute {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        candidate: RouteCandidate,
        stops: Vec<ChargeStop>,
        total_time: SignedDuration,
        total_energy: KilowattHours,
        charging_cost: f64,
        arrival_battery: KilowattHours,
        feasible: bool,
    ) -> Self {
        AugmentedRoute {
            candidate,
            stops,
            total_time,
            total_energy,
            charging_cost,
            arrival_battery,
            feasible,
            recommended: false,
        }
    }

    pub fn candidate(&self) -> &RouteCandidate {
        &self.candidate
    }

    pub fn stops(&self) -> &[ChargeStop] {
        &self.stops
    }

    pub fn total_time(&self) -> SignedDuration {
        self.total_time
    }

    pub fn total_energy(&self) -> KilowattHours {
        self.total_energy
    }

    pub fn charging_cost(&self) -> f64 {
        self.charging_cost
    }

    pub fn arrival_battery(&self) -> KilowattHours {
        self.arrival_battery
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    pub fn is_recommended(&self) -> bool {
        self.recommended
    }

    pub(crate) fn set_recommended(&mut self, recommended: bool) {
        self.recommended = recommended;
    }
}
