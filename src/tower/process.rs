/*!
 * Tower Process Lifecycle
 *
 * Segment creation, radio launch, controller run, and teardown in the order
 * the other processes rely on.
 */

use super::{ControlTower, TowerStats};
use crate::core::config::AirportConfig;
use crate::core::errors::AirportError;
use crate::core::limits::BATCH_SIZE;
use crate::core::types::{AirportResult, RawPid};
use crate::ipc::shm::{ProcessSlot, SharedSegment};
use crate::monitoring::generate_run_id;
use crate::signals::{AirportSignal, KillNotifier, ListenerControl, Notifier, SignalListener};
use std::process::{Child, Command};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, info_span, warn};

/// Run the control tower to completion
///
/// Blocks until the radio exits; a radio that never exits blocks forever.
pub fn run_tower(config: &AirportConfig) -> AirportResult<TowerStats> {
    let span = info_span!("tower", run_id = %generate_run_id());
    let _entered = span.enter();
    debug!(config = ?config, "Tower configuration");

    let segment = Arc::new(SharedSegment::create(&config.shm_name)?);
    let tower_pid = segment.publish_self(ProcessSlot::Tower);
    info!(pid = tower_pid, "Control tower online");

    let notifier: Arc<dyn Notifier> = Arc::new(KillNotifier::radio(segment.clone()));
    let tower = ControlTower::new(config.clone(), notifier.clone());

    // Installed before the radio exists so a relayed batch never kills us
    let state = tower.state();
    let listener = SignalListener::spawn("tower-signals", &[AirportSignal::PlaneBatch], move |_| {
        let waiting = state.admit_planes(BATCH_SIZE);
        debug!(waiting = waiting, "Plane batch arrived");
        ListenerControl::Continue
    })?;

    let mut radio = spawn_radio(config)?;
    segment.publish(ProcessSlot::Radio, radio.id() as RawPid);
    info!(pid = radio.id(), path = %config.radio_path.display(), "Radio launched");
    thread::sleep(config.radio_startup_delay);

    let stats = match tower.run() {
        Ok(stats) => stats,
        Err(e) => {
            warn!(error = %e, "Controllers failed, shutting the radio down");
            abort_radio(notifier.as_ref(), &mut radio);
            return Err(e);
        }
    };

    let status = radio.wait().map_err(AirportError::RadioWait)?;
    if status.success() {
        info!("Radio exited");
    } else {
        warn!(status = %status, "Radio exited abnormally");
    }

    listener.shutdown();
    segment.unlink()?;

    match serde_json::to_string(&stats) {
        Ok(json) => info!(stats = %json, "Tower run complete"),
        Err(e) => warn!(error = %e, "Failed to serialize tower stats"),
    }
    Ok(stats)
}

/// Tell the radio to shut down, killing it if the signal cannot be sent, and
/// reap it
fn abort_radio(notifier: &dyn Notifier, radio: &mut Child) {
    if let Err(e) = notifier.notify(AirportSignal::Shutdown) {
        warn!(error = %e, "Failed to signal radio shutdown, killing it");
        if let Err(e) = radio.kill() {
            warn!(error = %e, "Failed to kill radio");
        }
    }
    match radio.wait() {
        Ok(status) => debug!(status = %status, "Radio reaped"),
        Err(e) => warn!(error = %e, "Failed to wait for radio"),
    }
}

fn spawn_radio(config: &AirportConfig) -> AirportResult<Child> {
    Command::new(&config.radio_path)
        .arg(&config.shm_name)
        .spawn()
        .map_err(|source| AirportError::Spawn {
            role: "radio process",
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::shm::ProcessSlot;
    use crate::signals::{MockNotifier, SignalError};

    #[test]
    fn test_abort_radio_signals_shutdown_and_reaps() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|signal| *signal == AirportSignal::Shutdown)
            .times(1)
            .returning(|_| Ok(()));

        let mut radio = Command::new("true").spawn().unwrap();
        abort_radio(&notifier, &mut radio);

        // Already reaped
        assert!(radio.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_abort_radio_kills_unreachable_radio() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(SignalError::TargetUnpublished(ProcessSlot::Radio)));

        let mut radio = Command::new("sleep").arg("30").spawn().unwrap();
        let started = std::time::Instant::now();
        abort_radio(&notifier, &mut radio);

        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert!(radio.try_wait().unwrap().is_some());
    }
}
