/*!
 * Runway Pool
 *
 * Fixed set of exclusive runway slots acquired by non-blocking attempts.
 * No fairness: whichever controller polls a free slot first wins it.
 */

use crate::core::limits::RUNWAY_COUNT;
use crate::core::types::RunwayId;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-slot usage counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunwayStats {
    pub acquisitions: Vec<u64>,
}

pub struct RunwayPool {
    slots: [Mutex<()>; RUNWAY_COUNT],
    acquisitions: [AtomicU64; RUNWAY_COUNT],
}

/// Exclusive hold on one runway; the slot is released on drop
#[must_use = "dropping the guard releases the runway immediately"]
pub struct RunwayGuard<'a> {
    id: RunwayId,
    _slot: MutexGuard<'a, ()>,
}

impl RunwayPool {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Mutex::new(())),
            acquisitions: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Try each slot once, lowest id first
    pub fn try_acquire(&self) -> Option<RunwayGuard<'_>> {
        self.slots.iter().enumerate().find_map(|(id, slot)| {
            slot.try_lock().map(|guard| {
                self.acquisitions[id].fetch_add(1, Ordering::Relaxed);
                RunwayGuard { id, _slot: guard }
            })
        })
    }

    /// Return a slot to the pool
    ///
    /// Equivalent to dropping the guard; pollers notice on their next attempt.
    pub fn release(&self, guard: RunwayGuard<'_>) {
        drop(guard);
    }

    /// Number of slots currently held
    pub fn busy(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_locked()).count()
    }

    pub fn capacity(&self) -> usize {
        RUNWAY_COUNT
    }

    pub fn stats(&self) -> RunwayStats {
        RunwayStats {
            acquisitions: self
                .acquisitions
                .iter()
                .map(|count| count.load(Ordering::Relaxed))
                .collect(),
        }
    }
}

impl Default for RunwayPool {
    fn default() -> Self {
        Self::new()
    }
}

impl RunwayGuard<'_> {
    #[inline]
    pub fn id(&self) -> RunwayId {
        self.id
    }
}
