use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub, SubAssign},
};

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::units::kmh::Kmh;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Meters(f64);

impl Meters {
    pub const ZERO: Meters = Meters(0.0);

    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    pub fn from_kilometers(value: f64) -> Self {
        Meters(value * 1000.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn kilometers(&self) -> f64 {
        self.0 / 1000.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub fn abs(&self) -> Meters {
        Meters(self.0.abs())
    }
}

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap()
    }
}

impl From<f64> for Meters {
    fn from(value: f64) -> Self {
        Meters::new(value)
    }
}

impl Add for Meters {
    type Output = Meters;

    fn add(self, other: Meters) -> Meters {
        Meters(self.0 + other.0)
    }
}

impl AddAssign for Meters {
    fn add_assign(&mut self, other: Meters) {
        self.0 += other.0;
    }
}

impl Sub for Meters {
    type Output = Meters;

    fn sub(self, other: Meters) -> Meters {
        Meters(self.0 - other.0)
    }
}

impl SubAssign for Meters {
    fn sub_assign(&mut self, other: Meters) {
        self.0 -= other.0;
    }
}

impl Mul<f64> for Meters {
    type Output = Meters;

    fn mul(self, factor: f64) -> Meters {
        Meters(self.0 * factor)
    }
}

impl Div<Kmh> for Meters {
    type Output = SignedDuration;

    fn div(self, speed: Kmh) -> SignedDuration {
        let seconds = self.0 * 3.6 / speed.value();
        SignedDuration::from_secs_f64(seconds)
    }
}

impl Div<Meters> for Meters {
    type Output = f64;

    fn div(self, other: Meters) -> f64 {
        self.0 / other.0
    }
}

impl Sum for Meters {
    fn sum<I: Iterator<Item = Meters>>(iter: I) -> Meters {
        iter.fold(Meters::ZERO, |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_add_distances_together() {
        assert_eq!(Meters::new(10.0) + Meters::from_kilometers(1.0), Meters::new(1010.0));
    }

    #[test]
    fn should_convert_distance_to_travel_time() {
        let duration = Meters::from_kilometers(90.0) / Kmh::new(90.0);
        assert_eq!(duration, SignedDuration::from_secs(3600));
    }

    #[test]
    fn should_divide_distance() {
        assert_eq!(Meters::new(100.0) / Meters::new(10.0), 10.0);
    }
}
