use std::ops::Mul;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::units::kilowatt_hours::KilowattHours;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Kilowatts(f64);

impl Kilowatts {
    pub const ZERO: Kilowatts = Kilowatts(0.0);

    pub const fn new(value: f64) -> Self {
        Kilowatts(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn min(self, other: Kilowatts) -> Kilowatts {
        Kilowatts(self.0.min(other.0))
    }
}

impl Mul<SignedDuration> for Kilowatts {
    type Output = KilowattHours;

    fn mul(self, duration: SignedDuration) -> KilowattHours {
        KilowattHours::new(self.0 * duration.as_secs_f64() / 3600.0)
    }
}
