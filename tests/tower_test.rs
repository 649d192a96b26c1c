/*!
 * Control Tower Tests
 * Controller pool runs with recorded notifications
 */

mod common;

use airport_control::core::limits::{BATCH_SIZE, RUNWAY_COUNT, TOTAL_TAKEOFFS};
use airport_control::signals::AirportSignal;
use airport_control::tower::{AirportState, ControlTower};
use airport_control::AirportConfig;
use common::RecordingNotifier;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn config_with_takeoff(ms: u64) -> AirportConfig {
    AirportConfig {
        takeoff_duration: Duration::from_millis(ms),
        ..AirportConfig::fast()
    }
}

#[test]
fn test_ticked_admissions_send_four_batches_and_one_shutdown() {
    let notifier = Arc::new(RecordingNotifier::new());
    let tower = ControlTower::new(config_with_takeoff(5), notifier.clone());

    // Stand-in for ground control plus the radio relay
    let state = tower.state();
    let feeder = thread::spawn(move || {
        for _ in 0..4 {
            thread::sleep(Duration::from_millis(10));
            state.admit_planes(BATCH_SIZE);
        }
    });

    let stats = tower.run().unwrap();
    feeder.join().unwrap();

    assert_eq!(stats.total_takeoffs, TOTAL_TAKEOFFS);
    assert_eq!(stats.batches_completed, 4);
    assert_eq!(stats.planes_remaining, 0);
    assert!(stats.shutdown_sent);

    assert_eq!(notifier.count(AirportSignal::TakeoffBatch), 4);
    assert_eq!(notifier.count(AirportSignal::Shutdown), 1);
    assert_eq!(notifier.sent().last(), Some(&AirportSignal::Shutdown));
}

#[test]
fn test_preloaded_planes_limited_by_two_runways() {
    let takeoff = Duration::from_millis(25);
    let notifier = Arc::new(RecordingNotifier::new());
    let tower = ControlTower::with_state(
        config_with_takeoff(25),
        notifier.clone(),
        Arc::new(AirportState::with_planes(TOTAL_TAKEOFFS)),
    );

    let stats = tower.run().unwrap();

    assert_eq!(stats.total_takeoffs, TOTAL_TAKEOFFS);
    // At most two takeoffs proceed in parallel
    let waves = TOTAL_TAKEOFFS.div_ceil(RUNWAY_COUNT as u32);
    assert!(
        stats.elapsed >= takeoff * waves,
        "elapsed {:?} below {} takeoff waves",
        stats.elapsed,
        waves
    );

    assert_eq!(stats.runways.acquisitions.len(), RUNWAY_COUNT);
    let acquisitions: u64 = stats.runways.acquisitions.iter().sum();
    assert!(acquisitions >= TOTAL_TAKEOFFS as u64);
}

#[test]
fn test_controller_reports_sum_to_total() {
    let notifier = Arc::new(RecordingNotifier::new());
    let tower = ControlTower::with_state(
        config_with_takeoff(2),
        notifier.clone(),
        Arc::new(AirportState::with_planes(TOTAL_TAKEOFFS + 7)),
    );

    let stats = tower.run().unwrap();

    let per_controller: u32 = stats.controllers.iter().map(|r| r.takeoffs).sum();
    assert_eq!(per_controller, TOTAL_TAKEOFFS);
    assert_eq!(stats.controllers.len(), 5);
    assert_eq!(stats.controllers.iter().filter(|r| r.sent_shutdown).count(), 1);

    // Surplus planes are never cleared
    assert_eq!(stats.planes_remaining, 7);
    assert_eq!(notifier.count(AirportSignal::Shutdown), 1);
}

#[test]
fn test_idle_controllers_wait_for_late_planes() {
    let notifier = Arc::new(RecordingNotifier::new());
    let tower = ControlTower::new(config_with_takeoff(1), notifier.clone());

    let state = tower.state();
    let feeder = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        state.admit_planes(TOTAL_TAKEOFFS);
    });

    let stats = tower.run().unwrap();
    feeder.join().unwrap();

    assert_eq!(stats.total_takeoffs, TOTAL_TAKEOFFS);
    let idle: u64 = stats.controllers.iter().map(|r| r.idle_polls).sum();
    assert!(idle > 0);
}
