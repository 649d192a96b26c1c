/*!
 * Ground Control - Entry Point
 *
 * Attaches to the tower's identity block and admits planes on a timer until
 * the shutdown signal arrives.
 */

use airport_control::{init_tracing, run_ground_control, AirportConfig};
use tracing::{info, warn};

fn main() -> miette::Result<()> {
    init_tracing();

    let config = AirportConfig::from_env();
    info!(shm = %config.shm_name, "Ground control starting...");

    let traffic = run_ground_control(&config)?;
    match serde_json::to_string(&traffic) {
        Ok(json) => info!(traffic = %json, "Ground control finished"),
        Err(e) => warn!(error = %e, "Failed to serialize traffic stats"),
    }
    Ok(())
}
