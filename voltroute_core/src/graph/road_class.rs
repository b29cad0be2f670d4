use serde::{Deserialize, Serialize};

use crate::units::Kmh;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Residential,
}

impl RoadClass {
    pub fn default_speed(&self) -> Kmh {
        match self {
            RoadClass::Motorway => Kmh::new(120.0),
            RoadClass::Trunk => Kmh::new(100.0),
            RoadClass::Primary => Kmh::new(90.0),
            RoadClass::Secondary => Kmh::new(70.0),
            RoadClass::Residential => Kmh::new(30.0),
        }
    }
}
