/*!
 * Core Types
 * Common types used across the airport processes
 */

/// Raw OS process id as stored in the shared identity block
pub type RawPid = i32;

/// Index of a takeoff controller thread
pub type ControllerId = usize;

/// Index of a runway slot
pub type RunwayId = usize;

/// Plane and takeoff counts
pub type Count = u32;

/// Common result type for airport operations
pub type AirportResult<T> = Result<T, super::errors::AirportError>;
