use std::sync::Arc;

use voltroute_core::plan::Planner;
use voltroute_core::session::SessionManager;

pub struct AppState {
    pub planner: Arc<Planner>,
    pub sessions: SessionManager,
}
