/*!
 * Airport State
 * Tower counters behind a single lock
 */

use crate::core::limits::{BATCH_SIZE, TOTAL_TAKEOFFS};
use crate::core::types::Count;
use parking_lot::Mutex;
use serde::Serialize;

/// Counters mutated by controllers and the signal listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AirportCounters {
    /// Planes waiting to take off
    pub planes: Count,
    /// Takeoffs since the last batch notice, always below `BATCH_SIZE`
    pub takeoffs_in_batch: Count,
    /// Takeoffs this run, never above `TOTAL_TAKEOFFS`
    pub total_takeoffs: Count,
    /// Batch notices emitted
    pub batches_completed: Count,
    /// Whether the shutdown notice has been claimed
    pub shutdown_sent: bool,
}

/// Result of asking for a takeoff slot under the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    /// Limit already reached; nothing recorded
    LimitReached,
    /// No plane waiting; nothing recorded
    NoPlanes,
    /// One plane cleared and counted
    Cleared(Takeoff),
}

/// A recorded takeoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Takeoff {
    /// Sequence number, 1-based
    pub number: Count,
    /// This takeoff completed a batch of `BATCH_SIZE`
    pub batch_complete: bool,
    /// This takeoff reached `TOTAL_TAKEOFFS`
    pub final_takeoff: bool,
}

impl AirportCounters {
    #[inline]
    pub fn limit_reached(&self) -> bool {
        self.total_takeoffs >= TOTAL_TAKEOFFS
    }

    /// Add arriving planes
    pub fn admit(&mut self, planes: Count) {
        self.planes = self.planes.saturating_add(planes);
    }

    /// Record one takeoff if the limit allows and a plane is waiting
    pub fn clear_takeoff(&mut self) -> Clearance {
        if self.limit_reached() {
            return Clearance::LimitReached;
        }
        if self.planes == 0 {
            return Clearance::NoPlanes;
        }

        self.planes -= 1;
        self.takeoffs_in_batch += 1;
        self.total_takeoffs += 1;

        let batch_complete = self.takeoffs_in_batch == BATCH_SIZE;
        if batch_complete {
            self.takeoffs_in_batch = 0;
            self.batches_completed += 1;
        }

        Clearance::Cleared(Takeoff {
            number: self.total_takeoffs,
            batch_complete,
            final_takeoff: self.limit_reached(),
        })
    }
}

/// Guarded access to the tower counters
///
/// Every read-modify-write goes through `with_counters`, which holds the lock
/// for the closure only.
#[derive(Debug, Default)]
pub struct AirportState {
    counters: Mutex<AirportCounters>,
}

impl AirportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with planes already waiting
    pub fn with_planes(planes: Count) -> Self {
        let state = Self::new();
        state.admit_planes(planes);
        state
    }

    /// Run `f` with the counters locked
    #[inline]
    pub fn with_counters<R>(&self, f: impl FnOnce(&mut AirportCounters) -> R) -> R {
        let mut counters = self.counters.lock();
        f(&mut counters)
    }

    pub fn admit_planes(&self, planes: Count) -> Count {
        self.with_counters(|c| {
            c.admit(planes);
            c.planes
        })
    }

    pub fn limit_reached(&self) -> bool {
        self.with_counters(|c| c.limit_reached())
    }

    /// Claim the right to send the shutdown notice
    ///
    /// Returns true exactly once per run, and only after the limit is reached.
    pub fn claim_shutdown(&self) -> bool {
        self.with_counters(|c| {
            if c.limit_reached() && !c.shutdown_sent {
                c.shutdown_sent = true;
                true
            } else {
                false
            }
        })
    }

    pub fn snapshot(&self) -> AirportCounters {
        self.with_counters(|c| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_planes_records_nothing() {
        let mut counters = AirportCounters::default();
        assert_eq!(counters.clear_takeoff(), Clearance::NoPlanes);
        assert_eq!(counters, AirportCounters::default());
    }

    #[test]
    fn test_batch_and_final_flags() {
        let mut counters = AirportCounters::default();
        counters.admit(25);

        let takeoffs: Vec<Takeoff> = (0..20)
            .map(|_| match counters.clear_takeoff() {
                Clearance::Cleared(takeoff) => takeoff,
                other => panic!("unexpected clearance {:?}", other),
            })
            .collect();

        let batches: Vec<Count> = takeoffs
            .iter()
            .filter(|t| t.batch_complete)
            .map(|t| t.number)
            .collect();
        assert_eq!(batches, vec![5, 10, 15, 20]);
        assert!(takeoffs[19].final_takeoff);
        assert_eq!(takeoffs.iter().filter(|t| t.final_takeoff).count(), 1);

        // Remaining planes stay grounded
        assert_eq!(counters.clear_takeoff(), Clearance::LimitReached);
        assert_eq!(counters.planes, 5);
        assert_eq!(counters.total_takeoffs, TOTAL_TAKEOFFS);
    }

    #[test]
    fn test_claim_shutdown_once() {
        let state = AirportState::with_planes(TOTAL_TAKEOFFS);
        assert!(!state.claim_shutdown());

        for _ in 0..TOTAL_TAKEOFFS {
            state.with_counters(|c| c.clear_takeoff());
        }
        assert!(state.claim_shutdown());
        assert!(!state.claim_shutdown());
        assert!(state.snapshot().shutdown_sent);
    }

    proptest! {
        #[test]
        fn prop_counters_stay_in_bounds(ops in proptest::collection::vec(0u32..8, 0..200)) {
            let mut counters = AirportCounters::default();
            for op in ops {
                let before = counters.clone();
                if op == 0 {
                    counters.admit(BATCH_SIZE);
                    prop_assert_eq!(counters.planes, before.planes + BATCH_SIZE);
                    continue;
                }
                match counters.clear_takeoff() {
                    Clearance::Cleared(takeoff) => {
                        prop_assert!(before.planes > 0);
                        prop_assert_eq!(counters.planes, before.planes - 1);
                        prop_assert_eq!(counters.total_takeoffs, before.total_takeoffs + 1);
                        prop_assert_eq!(takeoff.number, counters.total_takeoffs);
                    }
                    Clearance::NoPlanes | Clearance::LimitReached => {
                        prop_assert_eq!(&counters, &before);
                    }
                }
                prop_assert!(counters.total_takeoffs <= TOTAL_TAKEOFFS);
                prop_assert!(counters.takeoffs_in_batch < BATCH_SIZE);
                prop_assert_eq!(counters.batches_completed, counters.total_takeoffs / BATCH_SIZE);
            }
        }
    }
}
