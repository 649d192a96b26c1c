/*!
 * Traffic Generator
 *
 * Ground control's local view of traffic. Admissions and reported takeoffs
 * arrive on different channels, so the backlog is an estimate.
 */

use crate::core::limits::{BATCH_SIZE, OVERLOAD_THRESHOLD, PLANES_LIMIT};
use crate::core::types::Count;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrafficGenerator {
    planes_admitted: Count,
    takeoffs_reported: Count,
    ticks: u64,
    admissions: u64,
}

/// Outcome of one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Backlog observed before this tick's admission
    pub backlog: Count,
    pub overloaded: bool,
    /// Planes admitted this tick, zero once the capacity is reached
    pub admitted: Count,
}

impl TickReport {
    /// Whether the radio must be told about new planes
    pub fn should_notify(&self) -> bool {
        self.admitted > 0
    }
}

impl TrafficGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Planes admitted but not yet reported as departed
    pub fn backlog(&self) -> Count {
        self.planes_admitted.saturating_sub(self.takeoffs_reported)
    }

    /// Timer tick: check the backlog, then admit a batch if capacity allows
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;

        let backlog = self.backlog();
        let overloaded = backlog >= OVERLOAD_THRESHOLD;

        let admitted = if self.planes_admitted < PLANES_LIMIT {
            self.planes_admitted += BATCH_SIZE;
            self.admissions += 1;
            BATCH_SIZE
        } else {
            0
        };

        TickReport {
            backlog,
            overloaded,
            admitted,
        }
    }

    /// A batch of takeoffs was reported by the radio
    pub fn record_takeoffs(&mut self) {
        self.takeoffs_reported = self.takeoffs_reported.saturating_add(BATCH_SIZE);
    }

    pub fn planes_admitted(&self) -> Count {
        self.planes_admitted
    }

    pub fn takeoffs_reported(&self) -> Count {
        self.takeoffs_reported
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn admissions(&self) -> u64 {
        self.admissions
    }
}
