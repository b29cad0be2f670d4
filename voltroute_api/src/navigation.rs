use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voltroute_core::energy::VehicleProfile;
use voltroute_core::geopoint::GeoPoint;
use voltroute_core::plan::AugmentedRoute;
use voltroute_core::session::{PositionUpdate, SessionStatus};
use voltroute_core::units::Soc;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartNavigationBody {
    route: AugmentedRoute,
    vehicle: VehicleProfile,
    start_soc: Soc,
}

#[derive(Serialize)]
pub struct StartNavigationResponse {
    session_id: Uuid,
}

pub async fn start_navigation_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartNavigationBody>,
) -> Result<Json<StartNavigationResponse>, ApiError> {
    body.vehicle.validate()?;

    let session_id = state
        .sessions
        .start(body.route, body.vehicle, body.start_soc)
        .await;

    Ok(Json(StartNavigationResponse { session_id }))
}

#[derive(Deserialize)]
pub struct PositionUpdateBody {
    position: GeoPoint,
    soc: Soc,
    timestamp_ms: u64,
}

#[derive(Serialize)]
pub struct PositionUpdateResponse {
    status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<AugmentedRoute>,
    warnings: Vec<String>,
}

pub async fn update_position_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<PositionUpdateBody>,
) -> Result<Json<PositionUpdateResponse>, ApiError> {
    let response = state
        .sessions
        .update_position(
            session_id,
            PositionUpdate {
                position: body.position,
                soc: body.soc,
                timestamp_ms: body.timestamp_ms,
            },
        )
        .await?;

    Ok(Json(PositionUpdateResponse {
        status: response.status,
        route: response.route,
        warnings: response.warnings,
    }))
}

#[derive(Serialize)]
pub struct CancelNavigationResponse {
    status: SessionStatus,
}

pub async fn cancel_navigation_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CancelNavigationResponse>, ApiError> {
    let status = state.sessions.cancel(session_id).await?;

    Ok(Json(CancelNavigationResponse { status }))
}
