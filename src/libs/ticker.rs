//! Periodic display refresh.
//!
//! A ticker only says "it is time to redraw". It carries no time value:
//! on every tick the consumer asks the timer engine to recompute elapsed
//! time from the persisted start instant, so ticks lost while the process
//! was frozen cost nothing.
//!
//! Stopping a ticker is idempotent and must happen on pause, finish,
//! cancel and backgrounding, otherwise the refresh task leaks.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time;

/// A recurring fire-and-forget refresh source.
pub trait Ticker {
    /// Starts ticking every `period`, replacing any running schedule.
    fn start(&mut self, period: Duration);
    /// Stops ticking. Safe to call when nothing is running.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Ticker backed by a tokio interval task.
///
/// Ticks are delivered through the receiver returned by [`TokioTicker::new`];
/// the first tick fires immediately after `start`.
pub struct TokioTicker {
    sender: UnboundedSender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TokioTicker {
    pub fn new() -> (Self, UnboundedReceiver<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, handle: None }, receiver)
    }
}

impl Ticker for TokioTicker {
    fn start(&mut self, period: Duration) {
        self.stop();

        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            loop {
                interval.tick().await;
                if sender.send(()).is_err() {
                    // Receiver gone, nobody is watching.
                    break;
                }
            }
        });
        self.handle = Some(handle);
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Default)]
struct ManualTickerState {
    running: bool,
    period: Option<Duration>,
    starts: usize,
    stops: usize,
}

/// Ticker that never fires on its own; it only records what it was asked
/// to do. Clones share state, so a caller can keep one to inspect the
/// schedule after handing another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    state: Arc<Mutex<ManualTickerState>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `start` was called.
    pub fn starts(&self) -> usize {
        self.state.lock().starts
    }

    /// Number of times `stop` actually stopped a running schedule.
    pub fn stops(&self) -> usize {
        self.state.lock().stops
    }

    pub fn period(&self) -> Option<Duration> {
        self.state.lock().period
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, period: Duration) {
        let mut state = self.state.lock();
        state.running = true;
        state.period = Some(period);
        state.starts += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        if state.running {
            state.running = false;
            state.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }
}
