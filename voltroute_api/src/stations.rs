use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use voltroute_core::stations::ChargingStation;

use crate::error::ApiError;
use crate::state::AppState;

/// Current station snapshot, as the charging-stations screen consumes it.
pub async fn list_stations_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChargingStation>>, ApiError> {
    let snapshot = state.planner.stations().load();
    Ok(Json(snapshot.stations().to_vec()))
}
