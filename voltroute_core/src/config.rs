use std::time::Instant;

use jiff::SignedDuration;
use serde::Deserialize;

use crate::units::{Kmh, Meters, Soc};

/// Policy knobs for planning and navigation. None of these have a canonical
/// production value; deployments override them via configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Battery level that must never be breached between charging stops.
    pub reserve_floor: Soc,
    /// Search radius around a route node when looking for off-route stations.
    pub corridor_radius: Meters,
    /// Assumed speed for the off-route detour to a charging station.
    pub detour_speed: Kmh,
    /// Number of alternative route candidates requested per plan.
    pub max_candidates: usize,
    /// Weight penalty applied to segments already used by earlier candidates.
    pub alternative_penalty: f64,
    /// Maximum snap distance from a requested coordinate to the road graph.
    pub snap_radius: Meters,
    /// Budget for one full plan pipeline run.
    pub plan_timeout: SignedDuration,
    /// Integration step for the charging curve.
    pub charge_step: SignedDuration,
    /// Upper bound on the dwell time the planner will schedule at one stop.
    pub max_dwell: SignedDuration,
    /// Corridor band around the planned path; beyond it the vehicle counts
    /// as deviated.
    pub deviation_tolerance: Meters,
    /// How long a deviation must persist before a reroute is triggered.
    pub deviation_debounce: SignedDuration,
    /// Radius around the destination that counts as arrival.
    pub arrival_radius: Meters,
    /// Radius around the next planned stop within which its live
    /// availability is re-checked.
    pub stop_approach_radius: Meters,
    /// Consecutive replan failures tolerated before a session aborts.
    pub replan_retries: u32,
    /// Station snapshot refresh interval.
    pub snapshot_refresh: SignedDuration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            reserve_floor: Soc::from_percent(5.0),
            corridor_radius: Meters::new(2_500.0),
            detour_speed: Kmh::new(40.0),
            max_candidates: 3,
            alternative_penalty: 1.4,
            snap_radius: Meters::new(5_000.0),
            plan_timeout: SignedDuration::from_secs(10),
            charge_step: SignedDuration::from_secs(30),
            max_dwell: SignedDuration::from_secs(4 * 3600),
            deviation_tolerance: Meters::new(250.0),
            deviation_debounce: SignedDuration::from_secs(20),
            arrival_radius: Meters::new(150.0),
            stop_approach_radius: Meters::new(1_500.0),
            replan_retries: 3,
            snapshot_refresh: SignedDuration::from_secs(60),
        }
    }
}

/// Wall-clock budget for one planning run, checked between pipeline phases.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn after(budget: SignedDuration) -> Self {
        Deadline {
            expires_at: Instant::now() + budget.unsigned_abs(),
        }
    }

    pub fn exceeded(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
