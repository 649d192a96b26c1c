/*!
 * Ground Control Process
 *
 * Single-threaded event loop multiplexing the admission timer with signals
 * forwarded from the listener thread over a channel.
 */

use super::traffic::TrafficGenerator;
use crate::core::config::AirportConfig;
use crate::core::limits::MIN_TRAFFIC_INTERVAL;
use crate::core::types::AirportResult;
use crate::ipc::shm::{ProcessSlot, SharedSegment};
use crate::monitoring::generate_run_id;
use crate::signals::{AirportSignal, KillNotifier, ListenerControl, Notifier, SignalListener};
use flume::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// Inputs to the ground control loop besides the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundEvent {
    /// Radio relayed a batch of takeoffs
    TakeoffsReported,
    /// Radio relayed the tower's shutdown
    Shutdown,
}

impl GroundEvent {
    pub fn from_signal(signal: AirportSignal) -> Option<Self> {
        match signal {
            AirportSignal::TakeoffBatch => Some(GroundEvent::TakeoffsReported),
            AirportSignal::Shutdown => Some(GroundEvent::Shutdown),
            AirportSignal::PlaneBatch => None,
        }
    }
}

pub struct TrafficLoop {
    generator: TrafficGenerator,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl TrafficLoop {
    /// Intervals below `MIN_TRAFFIC_INTERVAL` are raised to it
    pub fn new(notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self {
            generator: TrafficGenerator::new(),
            notifier,
            interval: interval.max(MIN_TRAFFIC_INTERVAL),
        }
    }

    /// Run until shutdown or until every sender is gone
    ///
    /// The first tick fires one interval after start.
    pub fn run(mut self, events: Receiver<GroundEvent>) -> TrafficGenerator {
        let mut next_tick = Instant::now() + self.interval;

        loop {
            match events.recv_deadline(next_tick) {
                Ok(GroundEvent::TakeoffsReported) => {
                    self.generator.record_takeoffs();
                    debug!(
                        reported = self.generator.takeoffs_reported(),
                        backlog = self.generator.backlog(),
                        "Takeoffs reported"
                    );
                }
                Ok(GroundEvent::Shutdown) => {
                    info!("Shutdown received");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.on_tick();
                    next_tick += self.interval;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Event channel closed, stopping traffic");
                    break;
                }
            }
        }

        self.generator
    }

    fn on_tick(&mut self) {
        let report = self.generator.tick();

        if report.overloaded {
            warn!(backlog = report.backlog, "RUNWAY OVERLOADED");
        }

        if report.should_notify() {
            debug!(
                admitted = report.admitted,
                total = self.generator.planes_admitted(),
                "Planes admitted"
            );
            if let Err(e) = self.notifier.notify(AirportSignal::PlaneBatch) {
                warn!(error = %e, "Failed to notify radio of new planes");
            }
        }
    }
}

/// Run ground control until the shutdown signal arrives
pub fn run_ground_control(config: &AirportConfig) -> AirportResult<TrafficGenerator> {
    let span = info_span!("ground_control", run_id = %generate_run_id());
    let _entered = span.enter();

    let segment = Arc::new(SharedSegment::open(
        &config.shm_name,
        config.shm_open_retries,
        config.shm_open_interval,
    )?);

    let (tx, rx) = flume::unbounded();
    let listener = SignalListener::spawn(
        "ground-signals",
        &[AirportSignal::TakeoffBatch, AirportSignal::Shutdown],
        move |signal| {
            let Some(event) = GroundEvent::from_signal(signal) else {
                return ListenerControl::Continue;
            };
            if tx.send(event).is_err() || event == GroundEvent::Shutdown {
                return ListenerControl::Stop;
            }
            ListenerControl::Continue
        },
    )?;

    // Published only once signals can be received
    let pid = segment.publish_self(ProcessSlot::Ground);
    info!(pid = pid, "Ground control online");

    let notifier = Arc::new(KillNotifier::radio(segment.clone()));
    let traffic = TrafficLoop::new(notifier, config.traffic_interval);
    let generator = traffic.run(rx);

    listener.shutdown();
    drop(segment);
    info!("finalization of operations...");

    Ok(generator)
}
