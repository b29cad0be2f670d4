use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use geojson::Value::LineString;
use geojson::{Feature, GeoJson, Geometry};
use serde::{Deserialize, Serialize};
use voltroute_core::energy::VehicleProfile;
use voltroute_core::geopoint::GeoPoint;
use voltroute_core::graph::RoadGraph;
use voltroute_core::plan::{AugmentedRoute, PlanRequest};
use voltroute_core::stations::ConnectorType;
use voltroute_core::units::Soc;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PlanRequestBody {
    source: GeoPoint,
    destination: GeoPoint,
    vehicle: VehicleProfile,
    start_soc: Soc,
    #[serde(default)]
    max_routes: Option<usize>,
}

#[derive(Serialize)]
pub struct PlanResponseBody {
    routes: Vec<RouteBody>,
    recommended_index: Option<usize>,
}

#[derive(Serialize)]
pub struct RouteBody {
    geometry: GeoJson,
    distance_meters: f64,
    total_time_seconds: f64,
    total_energy_kwh: f64,
    charging_cost: f64,
    arrival_battery_kwh: f64,
    feasible: bool,
    recommended: bool,
    charge_stops: Vec<ChargeStopBody>,
    /// The raw route, passed back verbatim to start navigation on it.
    route: AugmentedRoute,
}

#[derive(Serialize)]
pub struct ChargeStopBody {
    station_id: u64,
    location: GeoPoint,
    connector: ConnectorType,
    rated_power_kw: f64,
    price_per_kwh: f64,
    dwell_seconds: f64,
    arrival_battery_kwh: f64,
    departure_battery_kwh: f64,
}

pub async fn plan_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlanRequestBody>,
) -> Result<Json<PlanResponseBody>, ApiError> {
    let request = PlanRequest {
        source: body.source,
        destination: body.destination,
        vehicle: body.vehicle,
        start_soc: body.start_soc,
        max_routes: body.max_routes,
        prefer_station: None,
    };

    let response = state.planner.plan_route(&request)?;

    let routes = response
        .routes
        .into_iter()
        .map(|route| route_body(state.planner.graph(), route))
        .collect();

    Ok(Json(PlanResponseBody {
        routes,
        recommended_index: response.recommended_index,
    }))
}

fn route_body(graph: &RoadGraph, route: AugmentedRoute) -> RouteBody {
    let points: Vec<Vec<f64>> = route
        .candidate()
        .nodes()
        .iter()
        .map(|node| {
            let position = graph.waypoint(*node).position();
            vec![position.lon, position.lat]
        })
        .collect();

    let feature = Feature {
        bbox: None,
        properties: None,
        foreign_members: None,
        id: None,
        geometry: Some(Geometry::new(LineString(points))),
    };

    let charge_stops = route
        .stops()
        .iter()
        .map(|stop| ChargeStopBody {
            station_id: stop.station().id.get(),
            location: stop.station().location,
            connector: stop.station().connector,
            rated_power_kw: stop.station().rated_power.value(),
            price_per_kwh: stop.station().price_per_kwh,
            dwell_seconds: stop.dwell().as_secs_f64(),
            arrival_battery_kwh: stop.arrival_battery().value(),
            departure_battery_kwh: stop.departure_battery().value(),
        })
        .collect();

    RouteBody {
        geometry: GeoJson::Feature(feature),
        distance_meters: route.candidate().total_distance().value(),
        total_time_seconds: route.total_time().as_secs_f64(),
        total_energy_kwh: route.total_energy().value(),
        charging_cost: route.charging_cost(),
        arrival_battery_kwh: route.arrival_battery().value(),
        feasible: route.is_feasible(),
        recommended: route.is_recommended(),
        charge_stops,
        route,
    }
}
