/*!
 * Signal Tests
 * Listener dispatch and kill-based delivery within this process
 */

mod common;

use airport_control::ipc::{ProcessSlot, SharedSegment};
use airport_control::signals::{
    AirportSignal, KillNotifier, ListenerControl, Notifier, SignalError, SignalListener,
};
use common::unique_shm_name;
use nix::sys::signal::{raise, Signal};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

#[test]
#[serial]
fn test_listener_dispatches_raised_signal() {
    let (tx, rx) = flume::unbounded();
    let listener = SignalListener::spawn("test-signals", &[AirportSignal::PlaneBatch], move |signal| {
        let _ = tx.send(signal);
        ListenerControl::Continue
    })
    .unwrap();

    raise(Signal::SIGUSR2).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), AirportSignal::PlaneBatch);

    raise(Signal::SIGUSR2).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), AirportSignal::PlaneBatch);

    listener.shutdown();
}

#[test]
#[serial]
fn test_listener_dispatches_every_signal_in_a_burst() {
    let (tx, rx) = flume::unbounded();
    let listener = SignalListener::spawn("test-burst", &[AirportSignal::PlaneBatch], move |signal| {
        let _ = tx.send(signal);
        ListenerControl::Continue
    })
    .unwrap();

    // Raised back to back, before the listener thread can wake
    for _ in 0..4 {
        raise(Signal::SIGUSR2).unwrap();
    }

    for _ in 0..4 {
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), AirportSignal::PlaneBatch);
    }
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    listener.shutdown();
}

#[test]
#[serial]
fn test_listener_stops_on_request() {
    let (tx, rx) = flume::unbounded();
    let listener = SignalListener::spawn("test-stop", &[AirportSignal::TakeoffBatch], move |signal| {
        let _ = tx.send(signal);
        ListenerControl::Stop
    })
    .unwrap();

    raise(Signal::SIGUSR1).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), AirportSignal::TakeoffBatch);

    // Handler thread has returned; the sender was dropped with it
    assert!(rx.recv_timeout(WAIT).is_err());
    listener.shutdown();
}

#[test]
#[serial]
fn test_kill_notifier_reaches_published_pid() {
    let segment = Arc::new(SharedSegment::create(&unique_shm_name("kill")).unwrap());
    // Stand in for the radio with our own pid
    segment.publish_self(ProcessSlot::Radio);

    let (tx, rx) = flume::unbounded();
    let listener = SignalListener::spawn("test-kill", &[AirportSignal::TakeoffBatch], move |signal| {
        let _ = tx.send(signal);
        ListenerControl::Continue
    })
    .unwrap();

    let notifier = KillNotifier::radio(segment.clone());
    notifier.notify(AirportSignal::TakeoffBatch).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), AirportSignal::TakeoffBatch);

    listener.shutdown();
    segment.unlink().unwrap();
}

#[test]
fn test_kill_notifier_requires_published_target() {
    let segment = Arc::new(SharedSegment::create(&unique_shm_name("unpublished")).unwrap());
    let notifier = KillNotifier::radio(segment.clone());

    match notifier.notify(AirportSignal::Shutdown) {
        Err(SignalError::TargetUnpublished(slot)) => assert_eq!(slot, ProcessSlot::Radio),
        other => panic!("expected unpublished target, got {:?}", other),
    }
}
