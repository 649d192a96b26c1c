/*!
 * Ground Control
 * Periodic plane admission and backlog tracking
 */

pub mod process;
pub mod traffic;

pub use process::{run_ground_control, GroundEvent, TrafficLoop};
pub use traffic::{TickReport, TrafficGenerator};
