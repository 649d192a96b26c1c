/*!
 * Monitoring Module
 * Logging setup and run correlation
 */

pub mod tracer;

pub use tracer::{generate_run_id, init_tracing};
