//! Root controller of the reading tracker.
//!
//! `ReadingTracker` owns exactly one [`TimerEngine`], one
//! [`ScreenStateRecorder`] and one [`SessionAggregator`]; whoever drives the
//! UI constructs it once and calls into it. It adds the glue none of the
//! three parts knows about: which book the open run belongs to, and what
//! the visible/hidden signal of the host means for both timer and screen.
//!
//! The book of the open run is kept under `timer_book`, written before the
//! run starts and removed after it ends, so a crash in between leaves at
//! worst a dangling key that `launch` discards.

use crate::libs::book::{Book, BookStatus};
use crate::libs::clock::Clock;
use crate::libs::error::{Result, TrackerError};
use crate::libs::library::Library;
use crate::libs::screen::{NavigationState, ScreenStateRecorder, Tab, View};
use crate::libs::session::{PageRange, SessionAggregator, SessionRecord};
use crate::libs::store::KeyValueStore;
use crate::libs::ticker::Ticker;
use crate::libs::timer::{FinishedRun, RunState, TimerEngine, TimerObserver};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub const TIMER_BOOK_KEY: &str = "timer_book";

/// Snapshot of the open run, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub state: RunState,
    pub elapsed: u64,
    pub book_id: Option<i64>,
}

impl RunStatus {
    pub fn is_active(&self) -> bool {
        self.state != RunState::Idle
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, RunState::Paused { .. })
    }
}

/// What `begin_reading` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginOutcome {
    /// A new run was started.
    Started,
    /// A run for the same book was already open; the refresh was re-attached.
    Attached { elapsed: u64 },
}

/// Result of a completed reading run.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub run: FinishedRun,
    pub session: SessionRecord,
    pub book: Book,
}

pub struct ReadingTracker<S, C, L> {
    store: S,
    timer: TimerEngine<S, C>,
    screen: ScreenStateRecorder<S, C>,
    sessions: SessionAggregator<L>,
}

impl<S, C, L> ReadingTracker<S, C, L>
where
    S: KeyValueStore + Clone,
    C: Clock + Clone,
    L: Library,
{
    pub fn new(store: S, clock: C, ticker: Box<dyn Ticker>, library: L) -> Self {
        Self {
            timer: TimerEngine::new(store.clone(), clock.clone(), ticker),
            screen: ScreenStateRecorder::new(store.clone(), clock),
            sessions: SessionAggregator::new(library),
            store,
        }
    }

    pub fn with_refresh_period(mut self, period: std::time::Duration) -> Self {
        self.timer = self.timer.with_refresh_period(period);
        self
    }

    pub fn subscribe(&mut self, observer: Box<dyn TimerObserver>) {
        self.timer.subscribe(observer);
    }

    pub fn timer(&self) -> &TimerEngine<S, C> {
        &self.timer
    }

    pub fn screen(&self) -> &ScreenStateRecorder<S, C> {
        &self.screen
    }

    pub fn sessions(&self) -> &SessionAggregator<L> {
        &self.sessions
    }

    pub fn library(&self) -> &L {
        self.sessions.library()
    }

    /// Rebuilds state after a process start: recovers the timer, then
    /// consumes any fresh screen snapshot. The refresh stays off.
    pub fn launch(&mut self) -> Result<RunStatus> {
        let state = self.timer.recover_on_launch()?;
        if state == RunState::Idle {
            self.store.remove(TIMER_BOOK_KEY)?;
        }
        if self.screen.restore().is_some() {
            self.screen.clear()?;
        }
        self.status()
    }

    pub fn status(&self) -> Result<RunStatus> {
        Ok(RunStatus {
            state: self.timer.state(),
            elapsed: self.timer.elapsed_seconds(),
            book_id: self.current_book_id()?,
        })
    }

    /// Book the open run belongs to.
    pub fn current_book_id(&self) -> Result<Option<i64>> {
        if !self.timer.is_active() {
            return Ok(None);
        }
        let Some(raw) = self.store.get(TIMER_BOOK_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                warn!(value = %raw, "discarding corrupt reading book id");
                self.store.remove(TIMER_BOOK_KEY)?;
                Ok(None)
            }
        }
    }

    /// Opens the reading view for `book_id` and starts a run, or re-attaches
    /// to the open run when it already belongs to that book.
    ///
    /// # Errors
    ///
    /// * `BookNotFound` for an unknown book
    /// * `IllegalTransition` for an archived book
    /// * `RunAlreadyActive` when a run for another book is open
    pub fn begin_reading(&mut self, book_id: i64) -> Result<BeginOutcome> {
        let book = self.find_book(book_id)?;
        if book.is_archived() {
            return Err(TrackerError::IllegalTransition {
                from: BookStatus::Archived,
                to: BookStatus::Reading,
            });
        }

        if self.timer.is_active() {
            if self.current_book_id()? != Some(book_id) {
                return Err(TrackerError::RunAlreadyActive);
            }
            self.enter_reading_view(book_id)?;
            let elapsed = self.timer.attach_refresh();
            debug!(book_id, elapsed, "re-attached to open run");
            return Ok(BeginOutcome::Attached { elapsed });
        }

        self.store.set(TIMER_BOOK_KEY, &book_id.to_string())?;
        self.enter_reading_view(book_id)?;
        self.timer.start()?;
        Ok(BeginOutcome::Started)
    }

    /// Finishes the open run at `end_page` and records its session.
    ///
    /// The page range is checked before the run is closed; an invalid end
    /// page, or a session that cannot be stored, leaves the run open.
    pub fn complete_reading(&mut self, end_page: u32) -> Result<Completion> {
        if !self.timer.is_active() {
            return Err(TrackerError::NoActiveRun);
        }
        let book_id = self.current_book_id()?.ok_or(TrackerError::NoActiveRun)?;
        let book = self.find_book(book_id)?;
        let pages = PageRange::continuing(&book, end_page);
        if end_page < book.current_page || end_page > book.last_page {
            return Err(TrackerError::InvalidPageRange(format!(
                "end page must be between {} and {}",
                book.current_page, book.last_page
            )));
        }

        let run = self.timer.final_run()?;
        let session = self.sessions.record_session(book_id, &run, pages)?;
        let run = self.timer.finish_with(run)?;
        self.store.remove(TIMER_BOOK_KEY)?;
        self.leave_reading_view(book_id);

        let book = self.find_book(book_id)?;
        Ok(Completion { run, session, book })
    }

    /// Drops the open run without recording anything.
    pub fn abandon_reading(&mut self) -> Result<()> {
        let book_id = self.current_book_id()?;
        self.timer.cancel_run()?;
        self.store.remove(TIMER_BOOK_KEY)?;
        if let Some(book_id) = book_id {
            self.leave_reading_view(book_id);
        }
        Ok(())
    }

    /// Deletes every book and session and drops the open run together with
    /// its book key and the screen snapshot.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.sessions.library().clear_all()?;
        self.timer.cancel_run()?;
        self.store.remove(TIMER_BOOK_KEY)?;
        self.screen.clear()?;
        self.screen.set_navigation(NavigationState::default());
        debug!("all reading data cleared");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<u64> {
        self.timer.pause()
    }

    pub fn resume(&mut self) -> Result<u64> {
        self.timer.resume()
    }

    pub fn tick(&mut self) -> u64 {
        self.timer.tick()
    }

    /// Reacts to the host becoming visible or hidden.
    ///
    /// Hidden: snapshot the screen and stop the refresh. Visible: restore a
    /// fresh snapshot, resynchronise the timer, and re-attach the refresh
    /// when the user is back on the reading view of an open run. Returns the
    /// restored navigation, if any.
    pub fn visibility_changed(&mut self, visible: bool) -> Result<Option<NavigationState>> {
        if !visible {
            self.screen.save()?;
            self.timer.on_background();
            return Ok(None);
        }

        let restored = self.screen.restore();
        if restored.is_some() {
            self.screen.clear()?;
        }
        self.timer.on_foreground();

        let on_reading_view = restored.map(|nav| nav.view == View::Reading).unwrap_or(false);
        if on_reading_view && self.timer.is_active() && !self.timer.is_refreshing() {
            self.timer.attach_refresh();
        }
        Ok(restored)
    }

    /// Moves to `view`, snapshotting tracked views. Entering the reading
    /// view of an open run re-attaches its refresh.
    pub fn navigate(&mut self, view: View, book_id: Option<i64>) -> Result<()> {
        self.screen.navigate(view, book_id)?;
        if view == View::Reading && self.timer.is_active() && !self.timer.is_refreshing() {
            self.timer.attach_refresh();
        }
        Ok(())
    }

    pub fn record_manual_session(&self, book_id: i64, start: DateTime<Utc>, end: DateTime<Utc>, first_page: u32, last_page: u32) -> Result<SessionRecord> {
        self.sessions.record_manual_session(book_id, start, end, first_page, last_page)
    }

    fn find_book(&self, book_id: i64) -> Result<Book> {
        self.sessions.library().book(book_id)?.ok_or(TrackerError::BookNotFound(book_id))
    }

    fn enter_reading_view(&mut self, book_id: i64) -> Result<()> {
        let mut navigation = self.screen.navigation();
        navigation.tab = Tab::Read;
        self.screen.set_navigation(navigation);
        self.screen.navigate(View::Reading, Some(book_id))
    }

    /// Shows the book again without persisting; the run's end already
    /// cleared the snapshot.
    fn leave_reading_view(&mut self, book_id: i64) {
        let mut navigation = self.screen.navigation();
        navigation.view = View::BookDetails;
        navigation.book_id = Some(book_id);
        self.screen.set_navigation(navigation);
    }
}
