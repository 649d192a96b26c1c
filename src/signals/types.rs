/*!
 * Signal Types
 * Airport signal contract and result types
 */

use crate::core::types::RawPid;
use crate::ipc::shm::ProcessSlot;
use miette::Diagnostic;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use serde::Serialize;
use std::fmt;
use std::os::raw::c_int;
use thiserror::Error;

/// Signal operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal errors
#[derive(Error, Debug, Diagnostic)]
pub enum SignalError {
    #[error("Failed to register signal handlers: {0}")]
    #[diagnostic(code(signals::register_failed))]
    Register(#[source] std::io::Error),

    #[error("Failed to spawn signal listener thread: {0}")]
    #[diagnostic(code(signals::listener_spawn_failed))]
    ListenerSpawn(#[source] std::io::Error),

    #[error("No pid published for the {0} process yet")]
    #[diagnostic(
        code(signals::target_unpublished),
        help("The target process has not written its pid into shared memory.")
    )]
    TargetUnpublished(ProcessSlot),

    #[error("Failed to deliver {signal} to pid {pid}: {errno}")]
    #[diagnostic(code(signals::delivery_failed))]
    Delivery {
        signal: AirportSignal,
        pid: RawPid,
        errno: Errno,
    },
}

/// Notifications exchanged between the three processes
///
/// The same wire signal carries a notice in both directions: the tower sends
/// `TakeoffBatch` to the radio, which relays it to ground control, and ground
/// control sends `PlaneBatch` to the radio, which relays it to the tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportSignal {
    /// SIGUSR1: five takeoffs since the last notice
    TakeoffBatch,
    /// SIGUSR2: five planes admitted
    PlaneBatch,
    /// SIGTERM: takeoff limit reached
    Shutdown,
}

impl AirportSignal {
    pub const ALL: [AirportSignal; 3] = [
        AirportSignal::TakeoffBatch,
        AirportSignal::PlaneBatch,
        AirportSignal::Shutdown,
    ];

    /// Wire signal
    pub fn as_nix(self) -> Signal {
        match self {
            AirportSignal::TakeoffBatch => Signal::SIGUSR1,
            AirportSignal::PlaneBatch => Signal::SIGUSR2,
            AirportSignal::Shutdown => Signal::SIGTERM,
        }
    }

    /// Raw signal number
    pub fn raw(self) -> c_int {
        self.as_nix() as c_int
    }

    /// Map a raw signal number back, if it is part of the contract
    pub fn from_raw(raw: c_int) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.raw() == raw)
    }
}

impl fmt::Display for AirportSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.as_nix().as_str())
    }
}

/// Listener verdict after handling a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerControl {
    Continue,
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_mapping() {
        assert_eq!(AirportSignal::TakeoffBatch.as_nix(), Signal::SIGUSR1);
        assert_eq!(AirportSignal::PlaneBatch.as_nix(), Signal::SIGUSR2);
        assert_eq!(AirportSignal::Shutdown.as_nix(), Signal::SIGTERM);
    }

    #[test]
    fn test_from_raw() {
        for signal in AirportSignal::ALL {
            assert_eq!(AirportSignal::from_raw(signal.raw()), Some(signal));
        }
        assert_eq!(AirportSignal::from_raw(Signal::SIGINT as c_int), None);
    }
}
