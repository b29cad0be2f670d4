pub mod augmented_route;
pub mod charge_stop;
pub mod insertion;
pub mod planner;
pub mod ranker;

pub use augmented_route::AugmentedRoute;
pub use charge_stop::ChargeStop;
pub use insertion::StopPlanner;
pub use planner::{PlanRequest, PlanResponse, Planner};
pub use ranker::rank;
