/*!
 * Shared test helpers
 */

#![allow(dead_code)]

use airport_control::signals::{AirportSignal, Notifier, SignalResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Notifier that records every signal instead of sending it
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<AirportSignal>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<AirportSignal> {
        self.sent.lock().clone()
    }

    pub fn count(&self, signal: AirportSignal) -> usize {
        self.sent.lock().iter().filter(|s| **s == signal).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, signal: AirportSignal) -> SignalResult<()> {
        self.sent.lock().push(signal);
        Ok(())
    }
}

static NEXT_SEGMENT: AtomicUsize = AtomicUsize::new(0);

/// Segment name unique to this test process and call
pub fn unique_shm_name(tag: &str) -> String {
    format!(
        "/airport_test_{}_{}_{}",
        tag,
        std::process::id(),
        NEXT_SEGMENT.fetch_add(1, Ordering::Relaxed)
    )
}
