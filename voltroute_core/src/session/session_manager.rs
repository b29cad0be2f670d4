use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::energy::VehicleProfile;
use crate::error::{PlanError, SessionError};
use crate::plan::augmented_route::AugmentedRoute;
use crate::plan::planner::Planner;
use crate::routing::weighting::TravelTimeWeighting;
use crate::session::navigation_session::{
    NavigationSession, PositionUpdate, ReplanReason, UpdateOutcome,
};
use crate::session::status::SessionStatus;
use crate::units::Soc;

/// What `update_position` hands back to the service layer.
#[derive(Debug)]
pub struct UpdateResponse {
    pub status: SessionStatus,
    /// The replacement route when a replan landed since the previous update.
    pub route: Option<AugmentedRoute>,
    pub warnings: Vec<String>,
}

struct SessionHandle {
    session: Arc<NavigationSession>,
    /// Cancellation flag of the in-flight replan, if one is running. A newer
    /// trigger swaps in a fresh flag and trips the old one.
    replan_cancel: Mutex<Option<Arc<AtomicBool>>>,
}

/// Owns every live navigation session and drives their replans in the
/// background.
pub struct SessionManager {
    planner: Arc<Planner>,
    sessions: RwLock<HashMap<Uuid, Arc<SessionHandle>>>,
}

impl SessionManager {
    pub fn new(planner: Arc<Planner>) -> Self {
        SessionManager {
            planner,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn start(
        &self,
        route: AugmentedRoute,
        vehicle: VehicleProfile,
        start_soc: Soc,
    ) -> Uuid {
        let start_position = *self
            .planner
            .graph()
            .waypoint(route.candidate().source())
            .position();

        let session = Arc::new(NavigationSession::new(
            route,
            vehicle,
            start_soc,
            start_position,
            self.planner.config(),
        ));
        let id = session.id();

        info!(session = %id, "navigation session started");

        self.sessions.write().await.insert(
            id,
            Arc::new(SessionHandle {
                session,
                replan_cancel: Mutex::new(None),
            }),
        );

        id
    }

    pub async fn update_position(
        &self,
        id: Uuid,
        update: PositionUpdate,
    ) -> Result<UpdateResponse, SessionError> {
        let handle = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))?;

        let snapshot = self.planner.stations().load();
        let outcome: UpdateOutcome = handle.session.apply_update(
            self.planner.graph(),
            &TravelTimeWeighting::new(),
            &snapshot,
            self.planner.config(),
            update,
        );

        if let Some(reason) = outcome.replan.clone() {
            self.spawn_replan(Arc::clone(&handle), reason);
        }

        Ok(UpdateResponse {
            status: outcome.status,
            route: outcome.new_route,
            warnings: outcome.warnings,
        })
    }

    pub async fn status(&self, id: Uuid) -> Result<SessionStatus, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|handle| handle.session.status())
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn cancel(&self, id: Uuid) -> Result<SessionStatus, SessionError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;

        if let Some(flag) = handle.replan_cancel.lock().take() {
            flag.store(true, Ordering::Relaxed);
        }

        info!(session = %id, "navigation session cancelled");
        Ok(handle.session.cancel())
    }

    /// Replans in the background. A newer position update arriving while the
    /// replan runs cancels it and starts a fresh one from the newer state.
    fn spawn_replan(&self, handle: Arc<SessionHandle>, reason: ReplanReason) {
        let cancel = Arc::new(AtomicBool::new(false));
        if let Some(previous) = handle
            .replan_cancel
            .lock()
            .replace(Arc::clone(&cancel))
        {
            previous.store(true, Ordering::Relaxed);
        }

        let prefer = match reason {
            ReplanReason::StationUnavailable { fallback } => fallback,
            _ => None,
        };

        let planner = Arc::clone(&self.planner);
        let session = Arc::clone(&handle.session);

        tokio::spawn(async move {
            let request = session.replan_request(planner.graph(), prefer);

            match planner.plan_route_cancellable(&request, Some(&cancel)) {
                Ok(response) => {
                    match response.routes.into_iter().find(|route| route.is_feasible()) {
                        Some(route) => session.install_route(route),
                        None => {
                            session.replan_failed("no feasible route from current position");
                        }
                    }
                }
                Err(PlanError::Cancelled) => {
                    debug!(session = %session.id(), "replan superseded by a newer update");
                }
                Err(error) => {
                    session.replan_failed(&error.to_string());
                }
            }
        });
    }
}
