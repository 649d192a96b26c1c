/*!
 * Signal Traits
 * Outbound notification seam used by controllers and ground control
 */

use super::types::{AirportSignal, SignalResult};

/// Fire-and-forget delivery of a notification to the radio
///
/// Implementations must not block; callers log failures and carry on.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, signal: AirportSignal) -> SignalResult<()>;
}
