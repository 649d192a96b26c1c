/*!
 * Takeoff Controller
 *
 * One worker thread: wins a runway, clears a waiting plane, holds the runway
 * for the takeoff, and repeats until the takeoff limit is reached.
 *
 * Lock order is always runway first, then counters.
 */

use super::runway::{RunwayGuard, RunwayPool};
use super::state::{AirportState, Clearance};
use crate::core::config::AirportConfig;
use crate::core::types::{ControllerId, Count};
use crate::signals::{AirportSignal, Notifier};
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, info_span, trace, warn};

/// What one controller did during the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControllerReport {
    pub id: ControllerId,
    pub takeoffs: Count,
    /// Runways won while no plane was waiting
    pub idle_polls: u64,
    pub sent_shutdown: bool,
}

pub struct TakeoffController {
    id: ControllerId,
    state: Arc<AirportState>,
    runways: Arc<RunwayPool>,
    notifier: Arc<dyn Notifier>,
    takeoff_duration: Duration,
    runway_backoff: Duration,
    idle_backoff: Duration,
}

impl TakeoffController {
    pub fn new(
        id: ControllerId,
        state: Arc<AirportState>,
        runways: Arc<RunwayPool>,
        notifier: Arc<dyn Notifier>,
        config: &AirportConfig,
    ) -> Self {
        Self {
            id,
            state,
            runways,
            notifier,
            takeoff_duration: config.takeoff_duration,
            runway_backoff: config.runway_backoff,
            idle_backoff: config.idle_backoff,
        }
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// Controller loop; returns once the takeoff limit is reached
    pub fn run(&self) -> ControllerReport {
        let span = info_span!("controller", id = self.id);
        let _entered = span.enter();

        let mut report = ControllerReport {
            id: self.id,
            ..Default::default()
        };

        while !self.state.limit_reached() {
            let Some(runway) = self.acquire_runway() else {
                break;
            };

            let clearance = self.state.with_counters(|counters| {
                let clearance = counters.clear_takeoff();
                if let Clearance::Cleared(takeoff) = clearance {
                    if takeoff.batch_complete {
                        self.send(AirportSignal::TakeoffBatch);
                    }
                }
                clearance
            });

            match clearance {
                Clearance::LimitReached => break,
                Clearance::NoPlanes => {
                    self.runways.release(runway);
                    report.idle_polls += 1;
                    thread::sleep(self.idle_backoff);
                }
                Clearance::Cleared(takeoff) => {
                    debug!(runway = runway.id(), takeoff = takeoff.number, "Takeoff cleared");
                    if takeoff.batch_complete {
                        info!(total = takeoff.number, "Batch of takeoffs completed");
                    }

                    thread::sleep(self.takeoff_duration);
                    self.runways.release(runway);
                    report.takeoffs += 1;

                    if takeoff.final_takeoff && self.state.claim_shutdown() {
                        info!(total = takeoff.number, "Takeoff limit reached, shutting down radio");
                        self.send(AirportSignal::Shutdown);
                        report.sent_shutdown = true;
                    }
                }
            }
        }

        debug!(takeoffs = report.takeoffs, idle_polls = report.idle_polls, "Controller finished");
        report
    }

    /// Poll the pool until a runway is won or the limit is reached
    fn acquire_runway(&self) -> Option<RunwayGuard<'_>> {
        loop {
            if let Some(runway) = self.runways.try_acquire() {
                return Some(runway);
            }
            if self.state.limit_reached() {
                return None;
            }
            trace!("All runways busy");
            thread::sleep(self.runway_backoff);
        }
    }

    fn send(&self, signal: AirportSignal) {
        if let Err(e) = self.notifier.notify(signal) {
            warn!(signal = %signal, error = %e, "Failed to notify radio");
        }
    }
}
