//! Reading sessions and how they advance a book.
//!
//! A session is created exactly once, either from a finished timer run or
//! from a manual entry, and is never modified afterwards. Creating it also
//! moves the book forward: the next unread page becomes
//! `min(end_page + 1, last_page)` and the book is finished once the end page
//! reaches the last page.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bookking::db::{db::Db, library::SqliteLibrary};
//! use bookking::libs::session::{PageRange, SessionAggregator};
//! # fn demo(run: bookking::libs::timer::FinishedRun) -> anyhow::Result<()> {
//! let aggregator = SessionAggregator::new(SqliteLibrary::new(&Db::new()?));
//! let session = aggregator.record_session(1, &run, PageRange::new(12, 30))?;
//! println!("{} pages at {} pages/min", session.pages_read, session.reading_speed);
//! # Ok(())
//! # }
//! ```

use crate::libs::book::{Book, BookStatus, BookUpdate};
use crate::libs::error::{Result, TrackerError};
use crate::libs::library::Library;
use crate::libs::stats::{self, Period, PeriodStats};
use crate::libs::timer::FinishedRun;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A stored reading session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub book_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Active reading seconds. Authoritative whenever present; rows written
    /// before durations were tracked have none.
    pub duration_seconds: Option<u64>,
    pub start_page: u32,
    pub end_page: u32,
    pub pages_read: u32,
    /// Pages per minute, one decimal.
    pub reading_speed: f64,
}

impl SessionRecord {
    /// Active seconds, falling back to `end_time - start_time` when the
    /// stored duration is missing.
    pub fn duration_secs(&self) -> u64 {
        self.duration_seconds
            .unwrap_or_else(|| self.end_time.signed_duration_since(self.start_time).num_seconds().max(0) as u64)
    }
}

/// A session about to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub book_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: u64,
    pub start_page: u32,
    pub end_page: u32,
    pub pages_read: u32,
    pub reading_speed: f64,
}

impl NewSession {
    fn build(book_id: i64, start_time: DateTime<Utc>, end_time: DateTime<Utc>, duration_seconds: u64, pages: PageRange) -> Self {
        let pages_read = pages.pages_read();
        Self {
            book_id,
            start_time,
            end_time,
            duration_seconds,
            start_page: pages.start,
            end_page: pages.end,
            pages_read,
            reading_speed: reading_speed(pages_read, duration_seconds),
        }
    }
}

/// Inclusive page span of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Range that picks up at the book's next unread page.
    pub fn continuing(book: &Book, end: u32) -> Self {
        Self::new(book.current_page, end)
    }

    pub fn pages_read(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }
}

/// Pages per minute rounded to one decimal; 0 for a zero-length session.
pub fn reading_speed(pages_read: u32, duration_seconds: u64) -> f64 {
    if duration_seconds == 0 {
        return 0.0;
    }
    let per_minute = pages_read as f64 / (duration_seconds as f64 / 60.0);
    (per_minute * 10.0).round() / 10.0
}

/// Turns finished runs and manual entries into session records, and reads
/// statistics back out of them.
pub struct SessionAggregator<L> {
    library: L,
}

impl<L: Library> SessionAggregator<L> {
    pub fn new(library: L) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    /// Stores the session for a finished run and advances the book.
    ///
    /// Nothing is written when the range ends before the book's current
    /// page or past its last page.
    ///
    /// # Errors
    ///
    /// * `BookNotFound` if `book_id` is unknown
    /// * `InvalidPageRange` for an out-of-bounds range
    pub fn record_session(&self, book_id: i64, run: &FinishedRun, pages: PageRange) -> Result<SessionRecord> {
        let book = self.find_book(book_id)?;

        if pages.end < book.current_page {
            return Err(TrackerError::InvalidPageRange(format!(
                "end page {} is before the current page {}",
                pages.end, book.current_page
            )));
        }
        if pages.end > book.last_page {
            return Err(TrackerError::InvalidPageRange(format!(
                "end page {} is past the last page {}",
                pages.end, book.last_page
            )));
        }
        Self::check_bounds(&book, pages)?;

        // A clock moved backwards must not produce a session ending before it starts.
        let end_time = run.finished_at.max(run.started_at);
        let progress = Self::progress_update(&book, pages.end, run.started_at, end_time)?;

        let session = NewSession::build(book_id, run.started_at, end_time, run.elapsed_seconds, pages);
        let record = self.library.add_session(&session)?;
        self.library.update_book(book_id, &progress)?;

        debug!(book_id, session = record.id, pages = record.pages_read, "session recorded");
        Ok(record)
    }

    /// Stores a session entered by hand.
    ///
    /// The duration is the whole seconds between `start` and `end`. The book
    /// only advances when the session reaches at least its current page.
    ///
    /// # Errors
    ///
    /// * `InvalidSession` when `end` is not after `start`
    /// * `InvalidPageRange` when the pages fall outside the book
    pub fn record_manual_session(&self, book_id: i64, start: DateTime<Utc>, end: DateTime<Utc>, first_page: u32, last_page: u32) -> Result<SessionRecord> {
        if end <= start {
            return Err(TrackerError::InvalidSession(format!("end {end} is not after start {start}")));
        }
        let book = self.find_book(book_id)?;
        let pages = PageRange::new(first_page, last_page);
        Self::check_bounds(&book, pages)?;

        let progress = if last_page >= book.current_page {
            Some(Self::progress_update(&book, last_page, start, end)?)
        } else {
            None
        };

        let duration = (end.signed_duration_since(start).num_milliseconds() / 1000) as u64;
        let session = NewSession::build(book_id, start, end, duration, pages);
        let record = self.library.add_session(&session)?;
        if let Some(progress) = progress {
            self.library.update_book(book_id, &progress)?;
        }

        debug!(book_id, session = record.id, duration, "manual session recorded");
        Ok(record)
    }

    /// Statistics for the period around `anchor`, bucketed in `offset`.
    pub fn stats_for_period(&self, period: Period, anchor: NaiveDate, offset: FixedOffset) -> Result<PeriodStats> {
        let data = self.library.data()?;
        Ok(stats::stats_for_period(period, anchor, offset, &data.sessions, &data.books))
    }

    fn find_book(&self, book_id: i64) -> Result<Book> {
        self.library.book(book_id)?.ok_or(TrackerError::BookNotFound(book_id))
    }

    fn check_bounds(book: &Book, pages: PageRange) -> Result<()> {
        if pages.end < pages.start {
            return Err(TrackerError::InvalidPageRange(format!("end page {} is before start page {}", pages.end, pages.start)));
        }
        if pages.start < book.first_page || pages.end > book.last_page {
            return Err(TrackerError::InvalidPageRange(format!(
                "pages {}-{} fall outside {}-{}",
                pages.start, pages.end, book.first_page, book.last_page
            )));
        }
        Ok(())
    }

    /// Book changes implied by reading up to `end_page`.
    fn progress_update(book: &Book, end_page: u32, started: DateTime<Utc>, ended: DateTime<Utc>) -> Result<BookUpdate> {
        let status = if end_page >= book.last_page {
            BookStatus::Finished
        } else {
            BookStatus::Reading
        };
        book.check_transition(status)?;

        let finishing = status == BookStatus::Finished && book.date_finished.is_none();
        Ok(BookUpdate {
            current_page: Some((end_page + 1).min(book.last_page)),
            status: Some(status),
            date_started: book.date_started.is_none().then_some(started),
            date_finished: finishing.then_some(ended),
        })
    }
}
