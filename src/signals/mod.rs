/*!
 * Signals Module
 * Cross-process notifications carried by UNIX signals
 */

mod delivery;
mod listener;
pub mod traits;
pub mod types;

// Re-export public API
pub use delivery::KillNotifier;
pub use listener::SignalListener;
pub use traits::*;
pub use types::{AirportSignal, ListenerControl, SignalError, SignalResult};
