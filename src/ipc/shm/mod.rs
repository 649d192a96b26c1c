/*!
 * Shared Memory Module
 * Cross-process identity block shared by tower, radio and ground control
 */

pub mod segment;
pub mod types;

// Re-export public API
pub use segment::{SegmentRole, SharedSegment};
pub use types::{ProcessSlot, SharedIdentity, ShmError};
