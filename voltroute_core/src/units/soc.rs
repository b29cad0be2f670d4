use serde::{Deserialize, Serialize};

use crate::units::kilowatt_hours::KilowattHours;

/// State of charge as a fraction of battery capacity, in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Soc(f64);

impl Soc {
    pub const EMPTY: Soc = Soc(0.0);
    pub const FULL: Soc = Soc(1.0);

    pub fn new(fraction: f64) -> Self {
        Soc(fraction.clamp(0.0, 1.0))
    }

    pub fn from_percent(percent: f64) -> Self {
        Soc::new(percent / 100.0)
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 * 100.0
    }

    pub fn of(&self, capacity: KilowattHours) -> KilowattHours {
        KilowattHours::new(self.0 * capacity.value())
    }

    pub fn from_energy(energy: KilowattHours, capacity: KilowattHours) -> Self {
        Soc::new(energy.value() / capacity.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_clamp_out_of_range_fractions() {
        assert_eq!(Soc::new(1.4), Soc::FULL);
        assert_eq!(Soc::new(-0.1), Soc::EMPTY);
    }

    #[test]
    fn should_convert_to_energy() {
        let capacity = KilowattHours::new(40.0);
        assert_eq!(Soc::from_percent(30.0).of(capacity), KilowattHours::new(12.0));
    }
}
