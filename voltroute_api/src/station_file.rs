use std::path::PathBuf;

use anyhow::Context;
use voltroute_core::stations::{ChargingStation, StationFeed};

/// Station feed backed by a JSON file. The file is re-read on every poll, so
/// an operator (or an upstream sync job) can edit availability in place.
pub struct JsonStationFeed {
    path: PathBuf,
}

impl JsonStationFeed {
    pub fn new(path: PathBuf) -> Self {
        JsonStationFeed { path }
    }
}

impl StationFeed for JsonStationFeed {
    fn fetch(&self) -> anyhow::Result<Vec<ChargingStation>> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading station file {}", self.path.display()))?;

        let stations: Vec<ChargingStation> =
            serde_json::from_str(&contents).context("parsing station file")?;

        Ok(stations)
    }
}
