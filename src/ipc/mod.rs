/*!
 * IPC Module
 * Inter-process communication through POSIX shared memory
 */

pub mod shm;

// Re-export for convenience
pub use shm::{ProcessSlot, SegmentRole, SharedIdentity, SharedSegment, ShmError};
