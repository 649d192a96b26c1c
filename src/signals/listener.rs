/*!
 * Signal Listener
 *
 * Receives contract signals on a dedicated thread. Handlers run as ordinary
 * code on that thread, never inside an async signal handler, so they may take
 * locks and send on channels.
 *
 * The async handler only counts the delivery and writes a wake byte. Each
 * counted delivery is dispatched once, so a burst of identical signals is
 * never collapsed into a single event.
 */

use super::types::{AirportSignal, ListenerControl, SignalError, SignalResult};
use signal_hook::low_level;
use signal_hook::SigId;
use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Deliveries of one signal not yet dispatched
struct Pending {
    signal: AirportSignal,
    count: AtomicUsize,
}

/// Background thread dispatching received signals to a handler
///
/// Registration happens before `spawn` returns, so a signal sent afterwards
/// never hits the default disposition.
pub struct SignalListener {
    ids: Vec<SigId>,
    waker: Arc<UnixStream>,
    closed: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Register `signals` and run `on_signal` once per delivery
    ///
    /// Deliveries that pile up between wake-ups are dispatched in the order of
    /// `signals`. The thread ends when the handler returns
    /// `ListenerControl::Stop` or the listener is shut down.
    pub fn spawn<F>(name: &str, signals: &[AirportSignal], mut on_signal: F) -> SignalResult<Self>
    where
        F: FnMut(AirportSignal) -> ListenerControl + Send + 'static,
    {
        let (waker, mut reader) = UnixStream::pair().map_err(SignalError::Register)?;
        // A full socket only drops wake bytes; the counters keep every delivery
        waker.set_nonblocking(true).map_err(SignalError::Register)?;
        let waker = Arc::new(waker);

        let pending: Arc<Vec<Pending>> = Arc::new(
            signals
                .iter()
                .map(|&signal| Pending {
                    signal,
                    count: AtomicUsize::new(0),
                })
                .collect(),
        );

        let mut ids = Vec::with_capacity(signals.len());
        for index in 0..pending.len() {
            let counters = pending.clone();
            let wake = waker.clone();
            let raw = counters[index].signal.raw();
            // SAFETY: the action only does an atomic add and a non-blocking
            // write, both async-signal-safe, and allocates nothing
            let registered = unsafe {
                low_level::register(raw, move || {
                    counters[index].count.fetch_add(1, Ordering::Release);
                    let _ = (&*wake).write(&[1]);
                })
            };
            match registered {
                Ok(id) => ids.push(id),
                Err(e) => {
                    unregister_all(&ids);
                    return Err(SignalError::Register(e));
                }
            }
        }

        let closed = Arc::new(AtomicBool::new(false));
        let stopping = closed.clone();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut buf = [0u8; 64];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => break,
                        Ok(_) => {}
                        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                        Err(e) => {
                            warn!(error = %e, "Signal wake socket failed");
                            break;
                        }
                    }
                    if stopping.load(Ordering::Acquire) {
                        break;
                    }
                    if dispatch_pending(&pending, &mut on_signal) == ListenerControl::Stop {
                        break;
                    }
                }
                debug!("Signal listener finished");
            })
            .map_err(|e| {
                unregister_all(&ids);
                SignalError::ListenerSpawn(e)
            })?;

        Ok(Self {
            ids,
            waker,
            closed,
            thread: Some(thread),
        })
    }

    /// Stop listening and wait for the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        unregister_all(&self.ids);
        self.closed.store(true, Ordering::Release);
        let _ = (&*self.waker).write(&[0]);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Signal listener thread panicked");
            }
        }
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch_pending<F>(pending: &[Pending], on_signal: &mut F) -> ListenerControl
where
    F: FnMut(AirportSignal) -> ListenerControl,
{
    for entry in pending {
        let deliveries = entry.count.swap(0, Ordering::AcqRel);
        for _ in 0..deliveries {
            debug!(signal = %entry.signal, "Signal received");
            if on_signal(entry.signal) == ListenerControl::Stop {
                return ListenerControl::Stop;
            }
        }
    }
    ListenerControl::Continue
}

fn unregister_all(ids: &[SigId]) {
    for &id in ids {
        low_level::unregister(id);
    }
}
