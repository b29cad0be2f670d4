pub mod kilowatt_hours;
pub mod kilowatts;
pub mod kmh;
pub mod meters;
pub mod soc;

pub use kilowatt_hours::KilowattHours;
pub use kilowatts::Kilowatts;
pub use kmh::Kmh;
pub use meters::Meters;
pub use soc::Soc;
