/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use super::types::ControllerId;
use miette::Diagnostic;
use thiserror::Error;

// Re-export ShmError from the shared memory module
pub use crate::ipc::shm::ShmError;

// Re-export SignalError from the signals module
pub use crate::signals::SignalError;

/// Unified airport error type with miette diagnostics
///
/// Every variant is a resource-acquisition failure: the binaries report it and
/// exit non-zero. Contention and lost signals never surface here.
#[derive(Error, Debug, Diagnostic)]
pub enum AirportError {
    #[error("Shared memory error: {0}")]
    #[diagnostic(transparent)]
    Shm(#[from] ShmError),

    #[error("Signal error: {0}")]
    #[diagnostic(transparent)]
    Signal(#[from] SignalError),

    #[error("Failed to spawn {role}: {source}")]
    #[diagnostic(
        code(airport::spawn_failed),
        help("Check process and thread limits (ulimit -u) and that the executable exists.")
    )]
    Spawn {
        role: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Takeoff controller {0} panicked")]
    #[diagnostic(
        code(airport::controller_panicked),
        help("A controller thread aborted; the takeoff counters may be incomplete.")
    )]
    ControllerPanicked(ControllerId),

    #[error("Failed to wait for the radio process: {0}")]
    #[diagnostic(code(airport::radio_wait_failed))]
    RadioWait(#[source] std::io::Error),
}
