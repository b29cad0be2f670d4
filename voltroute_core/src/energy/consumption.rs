use serde::{Deserialize, Serialize};

use crate::graph::RoadSegment;
use crate::units::{KilowattHours, Kmh, Meters};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedMultiplier {
    pub speed: Kmh,
    pub multiplier: f64,
}

/// Maps distance, speed and elevation to consumed energy for one vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionCurve {
    /// Consumption on flat ground at the reference speed.
    base_kwh_per_km: f64,
    /// Piecewise-linear multiplier on the base consumption by travel speed.
    /// Breakpoints must be sorted by ascending speed.
    speed_multipliers: Vec<SpeedMultiplier>,
    /// Extra energy per meter of climb.
    climb_kwh_per_meter: f64,
    /// Fraction of the climb cost recovered on descents through regenerative
    /// braking.
    regen_efficiency: f64,
}

impl ConsumptionCurve {
    pub fn new(
        base_kwh_per_km: f64,
        speed_multipliers: Vec<SpeedMultiplier>,
        climb_kwh_per_meter: f64,
        regen_efficiency: f64,
    ) -> Self {
        ConsumptionCurve {
            base_kwh_per_km,
            speed_multipliers,
            climb_kwh_per_meter,
            regen_efficiency,
        }
    }

    /// Flat-ground curve: no elevation term, unit multiplier at every speed.
    pub fn flat(base_kwh_per_km: f64) -> Self {
        ConsumptionCurve::new(base_kwh_per_km, Vec::new(), 0.0, 0.0)
    }

    pub fn base_kwh_per_km(&self) -> f64 {
        self.base_kwh_per_km
    }

    pub fn speed_multipliers(&self) -> &[SpeedMultiplier] {
        &self.speed_multipliers
    }

    pub fn regen_efficiency(&self) -> f64 {
        self.regen_efficiency
    }

    fn multiplier_at(&self, speed: Kmh) -> f64 {
        let points = &self.speed_multipliers;

        let Some(first) = points.first() else {
            return 1.0;
        };
        if speed <= first.speed {
            return first.multiplier;
        }

        for window in points.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            if speed <= hi.speed {
                let span = hi.speed.value() - lo.speed.value();
                let t = (speed.value() - lo.speed.value()) / span;
                return lo.multiplier + t * (hi.multiplier - lo.multiplier);
            }
        }

        points.last().map(|p| p.multiplier).unwrap_or(1.0)
    }

    /// Energy to cover `distance` on flat ground at `speed`.
    pub fn energy_for_distance(&self, distance: Meters, speed: Kmh) -> KilowattHours {
        KilowattHours::new(distance.kilometers() * self.base_kwh_per_km * self.multiplier_at(speed))
    }

    /// Deterministic energy cost of one segment at the given travel speed.
    /// Descents recover part of the climb cost; a segment never yields net
    /// negative consumption.
    pub fn energy_for_segment(&self, segment: &RoadSegment, speed: Kmh) -> KilowattHours {
        let flat = self.energy_for_distance(segment.distance(), speed);

        let elevation = segment.elevation_delta().value();
        let vertical = if elevation >= 0.0 {
            KilowattHours::new(elevation * self.climb_kwh_per_meter)
        } else {
            KilowattHours::new(elevation * self.climb_kwh_per_meter * self.regen_efficiency)
        };

        (flat + vertical).max(KilowattHours::ZERO)
    }
}
