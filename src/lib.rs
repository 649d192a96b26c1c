/*!
 * Airport Control Library
 *
 * Control tower and ground control processes coordinating takeoffs through
 * a shared identity block and UNIX signals relayed by an external radio.
 */

pub mod core;
pub mod ground;
pub mod ipc;
pub mod monitoring;
pub mod signals;
pub mod tower;

// Re-exports
pub use crate::core::{AirportConfig, AirportError, AirportResult};
pub use ground::{run_ground_control, TrafficGenerator};
pub use ipc::{ProcessSlot, SharedIdentity, SharedSegment};
pub use monitoring::init_tracing;
pub use signals::{AirportSignal, KillNotifier, Notifier, SignalListener};
pub use tower::{run_tower, ControlTower, TowerStats};
