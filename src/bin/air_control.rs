/*!
 * Air Control - Control Tower Entry Point
 *
 * Creates the shared identity block, launches the radio and runs the takeoff
 * controllers until the takeoff limit is reached.
 */

use airport_control::{init_tracing, run_tower, AirportConfig};
use tracing::info;

fn main() -> miette::Result<()> {
    init_tracing();

    let config = AirportConfig::from_env();
    info!(shm = %config.shm_name, "Air control starting...");

    let stats = run_tower(&config)?;
    info!(
        total_takeoffs = stats.total_takeoffs,
        batches = stats.batches_completed,
        "Air control finished"
    );
    Ok(())
}
