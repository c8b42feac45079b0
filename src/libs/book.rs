//! Books and their reading-status lifecycle.
//!
//! A book moves `reading → finished` automatically when a session reaches
//! its last page, `finished → archived` on request, and back out of the
//! archive into whichever status its progress implies. Nothing else is
//! legal; [`BookStatus::can_transition`] is the single source of truth.

use crate::libs::error::{Result, TrackerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reading status of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Reading,
    Finished,
    Archived,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Reading => "reading",
            BookStatus::Finished => "finished",
            BookStatus::Archived => "archived",
        }
    }

    /// Whether a book may move from `self` to `to`.
    ///
    /// Staying in the same status is always allowed.
    pub fn can_transition(self, to: BookStatus) -> bool {
        use BookStatus::*;
        self == to || matches!((self, to), (Reading, Finished) | (Finished, Archived) | (Archived, Reading) | (Archived, Finished))
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "reading" => Ok(BookStatus::Reading),
            "finished" => Ok(BookStatus::Finished),
            "archived" => Ok(BookStatus::Archived),
            other => Err(format!("unknown book status '{other}'")),
        }
    }
}

/// A book as stored in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub first_page: u32,
    pub last_page: u32,
    /// Next unread page.
    pub current_page: u32,
    pub status: BookStatus,
    pub date_started: Option<DateTime<Utc>>,
    pub date_finished: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Reading progress in whole percent, 0 for a book without a page span.
    pub fn progress_percent(&self) -> u8 {
        if self.last_page <= self.first_page {
            return 0;
        }
        let read = self.current_page.saturating_sub(self.first_page) as f64;
        let span = (self.last_page - self.first_page) as f64;
        ((read / span) * 100.0).round().clamp(0.0, 100.0) as u8
    }

    pub fn is_archived(&self) -> bool {
        self.status == BookStatus::Archived
    }

    /// The update that moves a finished book into the archive.
    pub fn archive(&self, now: DateTime<Utc>) -> Result<BookUpdate> {
        self.check_transition(BookStatus::Archived)?;
        Ok(BookUpdate {
            status: Some(BookStatus::Archived),
            date_finished: self.date_finished.is_none().then_some(now),
            ..BookUpdate::default()
        })
    }

    /// The update that takes a book out of the archive.
    ///
    /// The new status follows progress: fully read books come back as
    /// finished, everything else as reading.
    pub fn unarchive(&self, now: DateTime<Utc>) -> Result<BookUpdate> {
        if !self.is_archived() {
            return Err(TrackerError::IllegalTransition {
                from: self.status,
                to: BookStatus::Reading,
            });
        }
        let status = if self.progress_percent() >= 100 {
            BookStatus::Finished
        } else {
            BookStatus::Reading
        };
        self.check_transition(status)?;
        Ok(BookUpdate {
            status: Some(status),
            date_finished: (status == BookStatus::Finished && self.date_finished.is_none()).then_some(now),
            ..BookUpdate::default()
        })
    }

    pub(crate) fn check_transition(&self, to: BookStatus) -> Result<()> {
        if self.status.can_transition(to) {
            Ok(())
        } else {
            Err(TrackerError::IllegalTransition { from: self.status, to })
        }
    }
}

/// Fields needed to add a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub first_page: u32,
    pub last_page: u32,
}

impl NewBook {
    pub fn new(title: &str, author: &str, first_page: u32, last_page: u32) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            first_page,
            last_page,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_page == 0 || self.last_page < self.first_page {
            return Err(TrackerError::InvalidPageRange(format!(
                "pages {}-{} do not form a range",
                self.first_page, self.last_page
            )));
        }
        Ok(())
    }
}

/// Partial book update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub current_page: Option<u32>,
    pub status: Option<BookStatus>,
    pub date_started: Option<DateTime<Utc>>,
    pub date_finished: Option<DateTime<Utc>>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        *self == BookUpdate::default()
    }

    /// Applies the update to an in-memory copy.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(page) = self.current_page {
            book.current_page = page;
        }
        if let Some(status) = self.status {
            book.status = status;
        }
        if let Some(date) = self.date_started {
            book.date_started = Some(date);
        }
        if let Some(date) = self.date_finished {
            book.date_finished = Some(date);
        }
    }
}
