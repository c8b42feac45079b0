//! Reading-session timer engine.
//!
//! Tracks the active reading time of a single run (start → finish, with any
//! number of pause/resume cycles in between) in a way that survives process
//! suspension, crashes and restarts.
//!
//! ## Model
//!
//! Elapsed time is never accumulated tick by tick. The engine persists the
//! wall-clock instant the run (re)started and derives
//! `elapsed = floor((now - start) / 1s)` whenever it is asked. A pause
//! freezes that value into `timer_elapsed`; a resume rebuilds the start
//! instant as `now - elapsed`, so the same formula keeps working.
//!
//! ## Persisted keys
//!
//! | key             | value                         | present while        |
//! |-----------------|-------------------------------|----------------------|
//! | `timer_active`  | `"true"`                      | a run is open        |
//! | `timer_start`   | epoch milliseconds            | a run is open        |
//! | `timer_elapsed` | whole seconds                 | the run is paused    |
//!
//! Writes are ordered so that a crash between any two of them leaves a state
//! `recover_on_launch` can interpret: `timer_active` is written last on
//! start and removed first on finish/cancel, and on resume the new start is
//! written before the paused value is dropped.
//!
//! ## Recovery precedence
//!
//! When both `timer_start` and `timer_elapsed` are present the run is
//! considered paused and `timer_elapsed` wins; the start instant is only used
//! when no paused value exists. A missing or unparseable `timer_start` means
//! there is no run at all.
//!
//! ## Usage
//!
//! ```rust
//! use bookking::libs::clock::ManualClock;
//! use bookking::libs::store::MemoryStore;
//! use bookking::libs::ticker::ManualTicker;
//! use bookking::libs::timer::TimerEngine;
//! use chrono::Duration;
//!
//! let clock = ManualClock::at_millis(1_700_000_000_000);
//! let mut timer = TimerEngine::new(MemoryStore::new(), clock.clone(), Box::new(ManualTicker::new()));
//! timer.start()?;
//! clock.advance(Duration::seconds(90));
//! let run = timer.finish()?;
//! assert_eq!(run.elapsed_seconds, 90);
//! # Ok::<(), bookking::libs::error::TrackerError>(())
//! ```

use crate::libs::clock::Clock;
use crate::libs::error::{Result, TrackerError};
use crate::libs::screen::SCREEN_STATE_KEY;
use crate::libs::store::KeyValueStore;
use crate::libs::ticker::Ticker;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

pub const TIMER_ACTIVE_KEY: &str = "timer_active";
pub const TIMER_START_KEY: &str = "timer_start";
pub const TIMER_ELAPSED_KEY: &str = "timer_elapsed";

const ACTIVE_VALUE: &str = "true";

/// Default display refresh period.
pub const DEFAULT_REFRESH_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);

/// In-memory view of the persisted timer keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run is open.
    Idle,
    /// The run is advancing; elapsed derives from `start`.
    Running { start: DateTime<Utc> },
    /// The run is open but frozen at `elapsed` seconds.
    Paused { start: DateTime<Utc>, elapsed: u64 },
}

/// A finished run, ready to become a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedRun {
    /// Start instant of the last running segment (`finish - elapsed` when
    /// the run was not paused at finish time).
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Active seconds, excluding paused intervals.
    pub elapsed_seconds: u64,
}

/// Transitions reported to observers after they succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Started,
    Paused { elapsed: u64 },
    Resumed { elapsed: u64 },
    Tick { elapsed: u64 },
    Finished(FinishedRun),
    Cancelled,
    Recovered { elapsed: u64, paused: bool },
}

/// Presentation hook; invoked after each successful transition.
pub trait TimerObserver {
    fn on_event(&mut self, event: &TimerEvent);
}

/// The timer state machine.
///
/// Owns its store and clock handles; construct one per application and pass
/// it to whatever drives the UI.
pub struct TimerEngine<S, C> {
    store: S,
    clock: C,
    ticker: Box<dyn Ticker>,
    refresh_period: std::time::Duration,
    state: RunState,
    /// Highest elapsed value observed in the current run.
    last_elapsed: u64,
    /// Whether a refresh should be running while the app is visible.
    refresh_wanted: bool,
    observers: Vec<Box<dyn TimerObserver>>,
}

impl<S: KeyValueStore, C: Clock> TimerEngine<S, C> {
    pub fn new(store: S, clock: C, ticker: Box<dyn Ticker>) -> Self {
        Self {
            store,
            clock,
            ticker,
            refresh_period: DEFAULT_REFRESH_PERIOD,
            state: RunState::Idle,
            last_elapsed: 0,
            refresh_wanted: false,
            observers: Vec::new(),
        }
    }

    pub fn with_refresh_period(mut self, period: std::time::Duration) -> Self {
        self.refresh_period = period;
        self
    }

    pub fn subscribe(&mut self, observer: Box<dyn TimerObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != RunState::Idle
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, RunState::Paused { .. })
    }

    /// Whether the periodic display refresh is currently scheduled.
    pub fn is_refreshing(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        match self.state {
            RunState::Idle => None,
            RunState::Running { start } | RunState::Paused { start, .. } => Some(start),
        }
    }

    /// Current elapsed seconds of the open run, 0 when idle.
    ///
    /// Never lower than a value already observed in this run, even if the
    /// wall clock was moved backwards in the meantime.
    pub fn elapsed_seconds(&self) -> u64 {
        match self.state {
            RunState::Idle => 0,
            RunState::Paused { elapsed, .. } => elapsed,
            RunState::Running { start } => self.elapsed_since(start).max(self.last_elapsed),
        }
    }

    /// Opens a new run at the current instant and starts the refresh.
    pub fn start(&mut self) -> Result<()> {
        if self.is_active() {
            return Err(TrackerError::RunAlreadyActive);
        }

        let now = self.clock.now();
        self.store.remove(TIMER_ELAPSED_KEY)?;
        self.store.set(TIMER_START_KEY, &now.timestamp_millis().to_string())?;
        self.store.set(TIMER_ACTIVE_KEY, ACTIVE_VALUE)?;

        self.state = RunState::Running { start: now };
        self.last_elapsed = 0;
        self.start_refresh();

        debug!(start = %now, "reading run started");
        self.notify(TimerEvent::Started);
        Ok(())
    }

    /// Freezes the run at its current elapsed value.
    pub fn pause(&mut self) -> Result<u64> {
        let start = match self.state {
            RunState::Idle => return Err(TrackerError::NoActiveRun),
            RunState::Paused { .. } => return Err(TrackerError::AlreadyPaused),
            RunState::Running { start } => start,
        };

        let elapsed = self.observe_elapsed();
        self.store.set(TIMER_ELAPSED_KEY, &elapsed.to_string())?;

        self.stop_refresh();
        self.state = RunState::Paused { start, elapsed };

        debug!(elapsed, "reading run paused");
        self.notify(TimerEvent::Paused { elapsed });
        Ok(elapsed)
    }

    /// Continues a paused run so that elapsed time picks up where it froze.
    pub fn resume(&mut self) -> Result<u64> {
        let in_memory = match self.state {
            RunState::Idle => return Err(TrackerError::NoActiveRun),
            RunState::Running { .. } => return Err(TrackerError::NotPaused),
            RunState::Paused { elapsed, .. } => elapsed,
        };

        let elapsed = match self.read_paused_elapsed()? {
            Some(stored) => stored,
            None => {
                debug!(elapsed = in_memory, "paused value missing, resuming from last known elapsed");
                in_memory.max(self.last_elapsed)
            }
        };

        let start = self.rewind(elapsed).ok_or_else(|| TrackerError::CorruptPersistedState {
            key: TIMER_ELAPSED_KEY.to_string(),
            reason: format!("{elapsed} seconds reach before the earliest representable instant"),
        })?;
        self.store.set(TIMER_START_KEY, &start.timestamp_millis().to_string())?;
        self.store.set(TIMER_ACTIVE_KEY, ACTIVE_VALUE)?;
        self.store.remove(TIMER_ELAPSED_KEY)?;

        self.state = RunState::Running { start };
        self.last_elapsed = elapsed;
        self.start_refresh();

        debug!(elapsed, start = %start, "reading run resumed");
        self.notify(TimerEvent::Resumed { elapsed });
        Ok(elapsed)
    }

    /// Closes the run and hands back its final timing.
    ///
    /// Clears every timer key and the screen-state snapshot.
    pub fn finish(&mut self) -> Result<FinishedRun> {
        let run = self.final_run()?;
        self.finish_with(run)
    }

    /// Final timing of the open run as of now, leaving the run open.
    ///
    /// Pair with [`TimerEngine::finish_with`] when the result has to be
    /// stored somewhere before the timer keys may go.
    pub fn final_run(&mut self) -> Result<FinishedRun> {
        let started_at = self.start_instant().ok_or(TrackerError::NoActiveRun)?;

        let elapsed_seconds = match self.state {
            RunState::Paused { elapsed, .. } => elapsed,
            _ => self.observe_elapsed(),
        };
        Ok(FinishedRun {
            started_at,
            finished_at: self.clock.now(),
            elapsed_seconds,
        })
    }

    /// Closes the open run with a timing taken earlier by
    /// [`TimerEngine::final_run`].
    pub fn finish_with(&mut self, run: FinishedRun) -> Result<FinishedRun> {
        if !self.is_active() {
            return Err(TrackerError::NoActiveRun);
        }
        let elapsed_seconds = run.elapsed_seconds;

        self.stop_refresh();
        self.clear_persisted()?;
        self.state = RunState::Idle;
        self.last_elapsed = 0;

        debug!(elapsed = elapsed_seconds, "reading run finished");
        self.notify(TimerEvent::Finished(run));
        Ok(run)
    }

    /// Drops the run without producing a session. Safe to call when idle.
    pub fn cancel_run(&mut self) -> Result<()> {
        self.stop_refresh();
        self.clear_persisted()?;
        self.state = RunState::Idle;
        self.last_elapsed = 0;

        debug!("reading run cancelled");
        self.notify(TimerEvent::Cancelled);
        Ok(())
    }

    /// Rebuilds the in-memory state from the store after a process start.
    ///
    /// Returns the recovered state. The refresh is not started here;
    /// it resumes only when a consumer calls [`TimerEngine::attach_refresh`].
    pub fn recover_on_launch(&mut self) -> Result<RunState> {
        self.ticker.stop();
        self.refresh_wanted = false;
        self.state = RunState::Idle;
        self.last_elapsed = 0;

        if self.store.get(TIMER_ACTIVE_KEY)?.as_deref() != Some(ACTIVE_VALUE) {
            // Leftovers of an interrupted start or finish.
            self.store.remove(TIMER_START_KEY)?;
            self.store.remove(TIMER_ELAPSED_KEY)?;
            self.store.remove(TIMER_ACTIVE_KEY)?;
            return Ok(RunState::Idle);
        }

        let start = match self.read_start()? {
            Some(start) => start,
            None => {
                warn!("active run without a usable start instant, discarding it");
                self.clear_timer_keys()?;
                return Ok(RunState::Idle);
            }
        };

        let (state, elapsed) = match self.read_paused_elapsed()? {
            Some(elapsed) => (RunState::Paused { start, elapsed }, elapsed),
            None => {
                let elapsed = self.elapsed_since(start);
                (RunState::Running { start }, elapsed)
            }
        };

        self.state = state;
        self.last_elapsed = elapsed;
        let paused = self.is_paused();

        debug!(elapsed, paused, "reading run recovered");
        self.notify(TimerEvent::Recovered { elapsed, paused });
        Ok(state)
    }

    /// Starts the refresh for an open, running run that has none.
    ///
    /// Called when a consumer starts observing the run again, e.g. when the
    /// reading view is shown after a relaunch.
    pub fn attach_refresh(&mut self) -> u64 {
        let elapsed = self.observe_elapsed();
        if let RunState::Running { .. } = self.state {
            self.start_refresh();
        }
        if self.is_active() {
            self.notify(TimerEvent::Tick { elapsed });
        }
        elapsed
    }

    /// Handles the host becoming visible again.
    ///
    /// Recomputes elapsed from the start instant, and restarts the refresh
    /// only if one was running before the app went to the background.
    pub fn on_foreground(&mut self) -> u64 {
        if !self.is_active() {
            return 0;
        }
        let elapsed = self.observe_elapsed();
        if self.refresh_wanted && matches!(self.state, RunState::Running { .. }) {
            self.ticker.start(self.refresh_period);
        }
        debug!(elapsed, "timer re-synchronised after foreground");
        self.notify(TimerEvent::Tick { elapsed });
        elapsed
    }

    /// Handles the host going to the background: nothing may tick while the
    /// process is frozen.
    pub fn on_background(&mut self) {
        self.ticker.stop();
    }

    /// One refresh tick: recompute and report elapsed time.
    pub fn tick(&mut self) -> u64 {
        let elapsed = self.observe_elapsed();
        if let RunState::Running { .. } = self.state {
            self.notify(TimerEvent::Tick { elapsed });
        }
        elapsed
    }

    fn start_refresh(&mut self) {
        self.refresh_wanted = true;
        self.ticker.start(self.refresh_period);
    }

    fn stop_refresh(&mut self) {
        self.refresh_wanted = false;
        self.ticker.stop();
    }

    /// Computes elapsed and records it as the run's high-water mark.
    fn observe_elapsed(&mut self) -> u64 {
        let elapsed = self.elapsed_seconds();
        if self.is_active() {
            self.last_elapsed = elapsed;
        }
        elapsed
    }

    /// Whole seconds from `start` to now, clamped at zero.
    fn elapsed_since(&self, start: DateTime<Utc>) -> u64 {
        let millis = self.clock.now().signed_duration_since(start).num_milliseconds();
        if millis < 0 {
            warn!(skew_ms = millis, "clock is behind the run start, clamping elapsed to zero");
            return 0;
        }
        (millis / 1000) as u64
    }

    fn read_start(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.store.get(TIMER_START_KEY)? else {
            return Ok(None);
        };
        let parsed = raw.trim().parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis);
        if parsed.is_none() {
            self.report_corrupt(TIMER_START_KEY, format!("unparseable value {raw:?}"));
        }
        Ok(parsed)
    }

    /// `now - elapsed`, or `None` when that instant is not representable.
    fn rewind(&self, elapsed: u64) -> Option<DateTime<Utc>> {
        let seconds = i64::try_from(elapsed).ok()?;
        let delta = TimeDelta::try_seconds(seconds)?;
        self.clock.now().checked_sub_signed(delta)
    }

    /// Reads `timer_elapsed`; a value that does not parse, or that no
    /// resume could turn back into a start instant, is removed and reported
    /// as absent.
    fn read_paused_elapsed(&self) -> Result<Option<u64>> {
        let Some(raw) = self.store.get(TIMER_ELAPSED_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(seconds) if seconds >= 0 => {
                let elapsed = seconds as u64;
                if self.rewind(elapsed).is_none() {
                    self.report_corrupt(TIMER_ELAPSED_KEY, format!("out of range value {raw:?}"));
                    self.store.remove(TIMER_ELAPSED_KEY)?;
                    return Ok(None);
                }
                Ok(Some(elapsed))
            }
            Ok(seconds) => {
                warn!(seconds, "negative paused elapsed value, clamping to zero");
                Ok(Some(0))
            }
            Err(_) => {
                self.report_corrupt(TIMER_ELAPSED_KEY, format!("unparseable value {raw:?}"));
                self.store.remove(TIMER_ELAPSED_KEY)?;
                Ok(None)
            }
        }
    }

    fn report_corrupt(&self, key: &str, reason: String) {
        let error = TrackerError::CorruptPersistedState {
            key: key.to_string(),
            reason,
        };
        warn!(%error, "discarding corrupt timer entry");
    }

    fn clear_timer_keys(&self) -> Result<()> {
        self.store.remove(TIMER_ACTIVE_KEY)?;
        self.store.remove(TIMER_START_KEY)?;
        self.store.remove(TIMER_ELAPSED_KEY)?;
        Ok(())
    }

    fn clear_persisted(&self) -> Result<()> {
        self.clear_timer_keys()?;
        self.store.remove(SCREEN_STATE_KEY)
    }

    fn notify(&mut self, event: TimerEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }
}
