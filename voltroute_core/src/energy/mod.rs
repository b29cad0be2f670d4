pub mod charging;
pub mod consumption;
pub mod vehicle_profile;

pub use charging::{ChargingCurve, ChargingCurvePoint, charge_gained, dwell_to_reach};
pub use consumption::{ConsumptionCurve, SpeedMultiplier};
pub use vehicle_profile::VehicleProfile;
