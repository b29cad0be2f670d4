use serde::{Deserialize, Serialize};

use crate::energy::charging::ChargingCurve;
use crate::energy::consumption::ConsumptionCurve;
use crate::error::PlanError;
use crate::stations::station::ConnectorType;
use crate::units::{KilowattHours, Kilowatts};

/// Everything the planner needs to know about one vehicle. Supplied per
/// request and immutable for the duration of the planning call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleProfile {
    battery_capacity: KilowattHours,
    consumption: ConsumptionCurve,
    charging: ChargingCurve,
    connectors: Vec<ConnectorType>,
}

impl VehicleProfile {
    pub fn new(
        battery_capacity: KilowattHours,
        consumption: ConsumptionCurve,
        charging: ChargingCurve,
        connectors: Vec<ConnectorType>,
    ) -> Self {
        VehicleProfile {
            battery_capacity,
            consumption,
            charging,
            connectors,
        }
    }

    pub fn battery_capacity(&self) -> KilowattHours {
        self.battery_capacity
    }

    pub fn consumption(&self) -> &ConsumptionCurve {
        &self.consumption
    }

    pub fn charging(&self) -> &ChargingCurve {
        &self.charging
    }

    pub fn connectors(&self) -> &[ConnectorType] {
        &self.connectors
    }

    /// Rejects malformed profiles before any planning starts.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.battery_capacity <= KilowattHours::ZERO {
            return Err(PlanError::InvalidVehicleProfile(
                "battery capacity must be positive".into(),
            ));
        }

        if self.consumption.base_kwh_per_km() <= 0.0 {
            return Err(PlanError::InvalidVehicleProfile(
                "base consumption must be positive".into(),
            ));
        }

        let regen = self.consumption.regen_efficiency();
        if !(0.0..=1.0).contains(&regen) {
            return Err(PlanError::InvalidVehicleProfile(
                "regen efficiency must be within 0..=1".into(),
            ));
        }

        let speeds = self.consumption.speed_multipliers();
        if speeds.windows(2).any(|w| w[1].speed <= w[0].speed) {
            return Err(PlanError::InvalidVehicleProfile(
                "speed multiplier breakpoints must be strictly increasing".into(),
            ));
        }

        let charge_points = self.charging.points();
        if charge_points.is_empty() {
            return Err(PlanError::InvalidVehicleProfile(
                "charging curve must have at least one point".into(),
            ));
        }
        if charge_points.windows(2).any(|w| w[1].soc < w[0].soc) {
            return Err(PlanError::InvalidVehicleProfile(
                "charging curve breakpoints must be sorted by SoC".into(),
            ));
        }
        if charge_points.iter().any(|p| p.power < Kilowatts::ZERO) {
            return Err(PlanError::InvalidVehicleProfile(
                "charging power cannot be negative".into(),
            ));
        }

        if self.connectors.is_empty() {
            return Err(PlanError::InvalidVehicleProfile(
                "vehicle supports no connector type".into(),
            ));
        }

        Ok(())
    }

    /// Fixed-shape profile used across the test suite: flat consumption and
    /// a constant charging curve.
    #[cfg(test)]
    pub fn test_profile(capacity_kwh: f64, kwh_per_km: f64, accepted_power_kw: f64) -> Self {
        VehicleProfile::new(
            KilowattHours::new(capacity_kwh),
            ConsumptionCurve::flat(kwh_per_km),
            ChargingCurve::constant(Kilowatts::new(accepted_power_kw)),
            vec![ConnectorType::Ccs2],
        )
    }
}
