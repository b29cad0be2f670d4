use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct KilowattHours(f64);

impl KilowattHours {
    pub const ZERO: KilowattHours = KilowattHours(0.0);

    pub const fn new(value: f64) -> Self {
        KilowattHours(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn min(self, other: KilowattHours) -> KilowattHours {
        KilowattHours(self.0.min(other.0))
    }

    pub fn max(self, other: KilowattHours) -> KilowattHours {
        KilowattHours(self.0.max(other.0))
    }
}

impl Eq for KilowattHours {}

impl PartialOrd for KilowattHours {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KilowattHours {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap()
    }
}

impl Add for KilowattHours {
    type Output = KilowattHours;

    fn add(self, other: KilowattHours) -> KilowattHours {
        KilowattHours(self.0 + other.0)
    }
}

impl AddAssign for KilowattHours {
    fn add_assign(&mut self, other: KilowattHours) {
        self.0 += other.0;
    }
}

impl Sub for KilowattHours {
    type Output = KilowattHours;

    fn sub(self, other: KilowattHours) -> KilowattHours {
        KilowattHours(self.0 - other.0)
    }
}

impl SubAssign for KilowattHours {
    fn sub_assign(&mut self, other: KilowattHours) {
        self.0 -= other.0;
    }
}

impl Mul<f64> for KilowattHours {
    type Output = KilowattHours;

    fn mul(self, factor: f64) -> KilowattHours {
        KilowattHours(self.0 * factor)
    }
}

impl Div<KilowattHours> for KilowattHours {
    type Output = f64;

    fn div(self, other: KilowattHours) -> f64 {
        self.0 / other.0
    }
}

impl Sum for KilowattHours {
    fn sum<I: Iterator<Item = KilowattHours>>(iter: I) -> KilowattHours {
        iter.fold(KilowattHours::ZERO, |acc, x| acc + x)
    }
}
