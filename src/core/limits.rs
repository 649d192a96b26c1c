/*!
 * System Limits and Constants
 *
 * Fixed sizes and thresholds shared by the tower and ground control.
 * Timing defaults live in `AirportConfig`.
 */

use super::types::Count;
use std::time::Duration;

// =============================================================================
// TOWER
// =============================================================================

/// Takeoffs after which the tower shuts the airport down
pub const TOTAL_TAKEOFFS: Count = 20;

/// Concurrent takeoff controllers
pub const CONTROLLER_COUNT: usize = 5;

/// Exclusive runway slots
pub const RUNWAY_COUNT: usize = 2;

/// Takeoffs per batch notification, and planes per admission batch
pub const BATCH_SIZE: Count = 5;

// =============================================================================
// GROUND CONTROL
// =============================================================================

/// Ground control stops admitting once this many planes were admitted
pub const PLANES_LIMIT: Count = 20;

/// Backlog at which ground control reports the runway as overloaded
pub const OVERLOAD_THRESHOLD: Count = 10;

// =============================================================================
// SHARED MEMORY
// =============================================================================

/// Default POSIX shared memory object name
pub const SHM_NAME: &str = "/air_control_memory";

/// Words in the identity block (tower, radio, ground)
pub const SHM_WORDS: usize = 3;

/// Size of the identity block in bytes
pub const SHM_LENGTH: usize = SHM_WORDS * std::mem::size_of::<i32>();

/// Default radio executable, relative to the tower's working directory
pub const RADIO_PATH: &str = "../radio/build/radio";

// =============================================================================
// TIMING DEFAULTS
// =============================================================================

/// Simulated takeoff time, runway held throughout
pub const TAKEOFF_DURATION: Duration = Duration::from_secs(1);

/// Pause between runway acquisition attempts
pub const RUNWAY_BACKOFF: Duration = Duration::from_millis(1);

/// Pause after winning a runway with no plane waiting
pub const IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// Ground control admission tick
pub const TRAFFIC_INTERVAL: Duration = Duration::from_millis(500);

/// Shortest admission tick the traffic loop accepts
pub const MIN_TRAFFIC_INTERVAL: Duration = Duration::from_millis(1);

/// Grace period given to the radio after launch
pub const RADIO_STARTUP_DELAY: Duration = Duration::from_millis(100);

/// Attempts ground control makes to open the segment
pub const SHM_OPEN_RETRIES: u32 = 10;

/// Pause between segment open attempts
pub const SHM_OPEN_INTERVAL: Duration = Duration::from_millis(100);
