mod error;
mod navigation;
mod plan;
mod state;
mod station_file;
mod stations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router, serve};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};
use voltroute_core::config::PlannerConfig;
use voltroute_core::graph::RoadGraph;
use voltroute_core::plan::Planner;
use voltroute_core::session::SessionManager;
use voltroute_core::stations::{StationFeed, StationSnapshot};

use crate::navigation::{
    cancel_navigation_handler, start_navigation_handler, update_position_handler,
};
use crate::plan::plan_handler;
use crate::state::AppState;
use crate::station_file::JsonStationFeed;
use crate::stations::list_stations_handler;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    dotenvy::from_filename("./.env.local").ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = load_config();

    let graph_path = env_or("VOLTROUTE_GRAPH", "./data/graph.bin");
    let graph = Arc::new(
        RoadGraph::from_file(Path::new(&graph_path)).expect("cannot load road graph file"),
    );
    info!(
        nodes = graph.node_count(),
        segments = graph.segment_count(),
        "loaded road graph"
    );

    let feed = JsonStationFeed::new(PathBuf::from(env_or(
        "VOLTROUTE_STATIONS",
        "./data/stations.json",
    )));
    let snapshot = Arc::new(StationSnapshot::empty());
    snapshot.refresh_from(&feed);

    let planner = Arc::new(Planner::new(graph, Arc::clone(&snapshot), config.clone()));

    spawn_snapshot_refresh(Arc::clone(&snapshot), feed, &config);

    let state = Arc::new(AppState {
        planner: Arc::clone(&planner),
        sessions: SessionManager::new(planner),
    });

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/plan", post(plan_handler))
        .route("/stations", get(list_stations_handler))
        .route("/navigation", post(start_navigation_handler))
        .route("/navigation/{session_id}/position", post(update_position_handler))
        .route("/navigation/{session_id}/cancel", post(cancel_navigation_handler))
        .layer(ServiceBuilder::new().layer(cors_layer))
        .with_state(state);

    let listen = env_or("VOLTROUTE_LISTEN", "127.0.0.1:8080");
    let listener = tokio::net::TcpListener::bind(&listen).await.unwrap();
    info!(%listen, "voltroute api listening");

    serve(listener, app).await.unwrap();
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_config() -> PlannerConfig {
    match std::env::var("VOLTROUTE_CONFIG") {
        Ok(path) => {
            let contents = std::fs::read_to_string(&path).expect("cannot read config file");
            serde_json::from_str(&contents).expect("cannot parse config file")
        }
        Err(_) => PlannerConfig::default(),
    }
}

fn spawn_snapshot_refresh(
    snapshot: Arc<StationSnapshot>,
    feed: impl StationFeed + 'static,
    config: &PlannerConfig,
) {
    let period = config.snapshot_refresh.unsigned_abs();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // the first tick fires immediately and the snapshot is already fresh
        interval.tick().await;

        loop {
            interval.tick().await;
            snapshot.refresh_from(&feed);
        }
    });
}
