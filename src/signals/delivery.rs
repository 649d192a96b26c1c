/*!
 * Signal Delivery
 * Sends contract signals to a process looked up in the identity block
 */

use super::traits::Notifier;
use super::types::{AirportSignal, SignalError, SignalResult};
use crate::ipc::shm::{ProcessSlot, SharedSegment};
use nix::sys::signal::kill;
use nix::unistd::Pid as NixPid;
use std::sync::Arc;
use tracing::trace;

/// Delivers notifications with `kill(2)` to the pid published in `target`
///
/// The pid is read on every send so a late-starting target is picked up as
/// soon as it publishes.
pub struct KillNotifier {
    segment: Arc<SharedSegment>,
    target: ProcessSlot,
}

impl KillNotifier {
    pub fn new(segment: Arc<SharedSegment>, target: ProcessSlot) -> Self {
        Self { segment, target }
    }

    /// Notifier addressing the radio process
    pub fn radio(segment: Arc<SharedSegment>) -> Self {
        Self::new(segment, ProcessSlot::Radio)
    }

    pub fn target(&self) -> ProcessSlot {
        self.target
    }
}

impl Notifier for KillNotifier {
    fn notify(&self, signal: AirportSignal) -> SignalResult<()> {
        let pid = self
            .segment
            .pid(self.target)
            .ok_or(SignalError::TargetUnpublished(self.target))?;

        kill(NixPid::from_raw(pid), signal.as_nix())
            .map_err(|errno| SignalError::Delivery { signal, pid, errno })?;

        trace!(signal = %signal, pid = pid, target = %self.target, "Signal sent");
        Ok(())
    }
}
