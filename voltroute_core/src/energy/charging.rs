use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::energy::vehicle_profile::VehicleProfile;
use crate::stations::station::ChargingStation;
use crate::units::{KilowattHours, Kilowatts, Soc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChargingCurvePoint {
    pub soc: Soc,
    pub power: Kilowatts,
}

/// Maximum power the battery accepts by state of charge. The accepted power
/// tapers as the battery fills; the effective charge rate at a station is
/// the lower of this curve and the station's rated power.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingCurve {
    /// Breakpoints sorted by ascending SoC.
    points: Vec<ChargingCurvePoint>,
}

impl ChargingCurve {
    pub fn new(points: Vec<ChargingCurvePoint>) -> Self {
        ChargingCurve { points }
    }

    /// Constant acceptance up to full, no taper.
    pub fn constant(power: Kilowatts) -> Self {
        ChargingCurve::new(vec![
            ChargingCurvePoint {
                soc: Soc::EMPTY,
                power,
            },
            ChargingCurvePoint {
                soc: Soc::FULL,
                power,
            },
        ])
    }

    pub fn points(&self) -> &[ChargingCurvePoint] {
        &self.points
    }

    pub fn max_power_at(&self, soc: Soc) -> Kilowatts {
        let points = &self.points;

        let Some(first) = points.first() else {
            return Kilowatts::ZERO;
        };
        if soc <= first.soc {
            return first.power;
        }

        for window in points.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            if soc <= hi.soc {
                let span = hi.soc.fraction() - lo.soc.fraction();
                if span <= 0.0 {
                    return hi.power;
                }
                let t = (soc.fraction() - lo.soc.fraction()) / span;
                return Kilowatts::new(lo.power.value() + t * (hi.power.value() - lo.power.value()));
            }
        }

        points.last().map(|p| p.power).unwrap_or(Kilowatts::ZERO)
    }
}

/// Energy gained by dwelling `dwell` at `station`, integrating the vehicle's
/// charging curve against the station's rated power in `step` increments.
pub fn charge_gained(
    station: &ChargingStation,
    arrival: KilowattHours,
    dwell: SignedDuration,
    profile: &VehicleProfile,
    step: SignedDuration,
) -> KilowattHours {
    let capacity = profile.battery_capacity();
    let mut battery = arrival.min(capacity);
    let mut remaining = dwell;

    while remaining > SignedDuration::ZERO && battery < capacity {
        let slice = remaining.min(step);
        let soc = Soc::from_energy(battery, capacity);
        let power = profile.charging().max_power_at(soc).min(station.rated_power);
        battery = (battery + power * slice).min(capacity);
        remaining -= slice;
    }

    battery - arrival.min(capacity)
}

/// Shortest dwell at `station` that lifts the battery from `arrival` to
/// `target`, stepping the charging curve forward. Returns the dwell and the
/// battery level actually reached; the level falls short of `target` when
/// `max_dwell` or the battery capacity caps the charge.
pub fn dwell_to_reach(
    station: &ChargingStation,
    arrival: KilowattHours,
    target: KilowattHours,
    profile: &VehicleProfile,
    step: SignedDuration,
    max_dwell: SignedDuration,
) -> (SignedDuration, KilowattHours) {
    let capacity = profile.battery_capacity();
    let target = target.min(capacity);
    let mut battery = arrival.min(capacity);
    let mut dwell = SignedDuration::ZERO;

    while battery < target && dwell < max_dwell {
        let soc = Soc::from_energy(battery, capacity);
        let power = profile.charging().max_power_at(soc).min(station.rated_power);
        if power <= Kilowatts::ZERO {
            break;
        }
        battery = (battery + power * step).min(capacity);
        dwell += step;
    }

    (dwell, battery)
}
