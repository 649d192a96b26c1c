/*!
 * Control Tower
 * Runs the takeoff controllers against a shared runway pool
 */

pub mod controller;
pub mod process;
pub mod runway;
pub mod state;

pub use controller::{ControllerReport, TakeoffController};
pub use process::run_tower;
pub use runway::{RunwayGuard, RunwayPool, RunwayStats};
pub use state::{AirportCounters, AirportState, Clearance, Takeoff};

use crate::core::config::AirportConfig;
use crate::core::errors::AirportError;
use crate::core::limits::CONTROLLER_COUNT;
use crate::core::types::{AirportResult, Count};
use crate::signals::Notifier;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// End-of-run summary
#[derive(Debug, Clone, Serialize)]
pub struct TowerStats {
    pub total_takeoffs: Count,
    pub batches_completed: Count,
    pub planes_remaining: Count,
    pub shutdown_sent: bool,
    pub runways: RunwayStats,
    pub controllers: Vec<ControllerReport>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

pub struct ControlTower {
    config: AirportConfig,
    state: Arc<AirportState>,
    runways: Arc<RunwayPool>,
    notifier: Arc<dyn Notifier>,
}

impl ControlTower {
    pub fn new(config: AirportConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_state(config, notifier, Arc::new(AirportState::new()))
    }

    pub fn with_state(
        config: AirportConfig,
        notifier: Arc<dyn Notifier>,
        state: Arc<AirportState>,
    ) -> Self {
        Self {
            config,
            state,
            runways: Arc::new(RunwayPool::new()),
            notifier,
        }
    }

    /// Shared counters, for the signal listener to admit planes
    pub fn state(&self) -> Arc<AirportState> {
        self.state.clone()
    }

    pub fn runways(&self) -> Arc<RunwayPool> {
        self.runways.clone()
    }

    /// Spawn all controllers and wait for every one of them
    pub fn run(&self) -> AirportResult<TowerStats> {
        let started = Instant::now();
        info!(
            controllers = CONTROLLER_COUNT,
            runways = self.runways.capacity(),
            "Starting takeoff controllers"
        );

        let handles = (0..CONTROLLER_COUNT)
            .map(|id| {
                let controller = TakeoffController::new(
                    id,
                    self.state.clone(),
                    self.runways.clone(),
                    self.notifier.clone(),
                    &self.config,
                );
                thread::Builder::new()
                    .name(format!("controller-{}", id))
                    .spawn(move || controller.run())
                    .map_err(|source| AirportError::Spawn {
                        role: "takeoff controller",
                        source,
                    })
            })
            .collect::<AirportResult<Vec<_>>>()?;

        let mut controllers = Vec::with_capacity(handles.len());
        for (id, handle) in handles.into_iter().enumerate() {
            let report = handle
                .join()
                .map_err(|_| AirportError::ControllerPanicked(id))?;
            controllers.push(report);
        }

        let counters = self.state.snapshot();
        let stats = TowerStats {
            total_takeoffs: counters.total_takeoffs,
            batches_completed: counters.batches_completed,
            planes_remaining: counters.planes,
            shutdown_sent: counters.shutdown_sent,
            runways: self.runways.stats(),
            controllers,
            elapsed: started.elapsed(),
        };

        info!(
            total_takeoffs = stats.total_takeoffs,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "All takeoff controllers finished"
        );
        Ok(stats)
    }
}
