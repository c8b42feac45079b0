//! Reading statistics.
//!
//! Pure folds over a session collection. Nothing here touches storage: the
//! same sessions, books, anchor date and offset always give the same
//! result. Sessions are placed on the calendar day their start time falls
//! on in the supplied `FixedOffset`.
//!
//! | period  | buckets                                   | books finished |
//! |---------|-------------------------------------------|----------------|
//! | `day`   | the anchor day                            | no             |
//! | `week`  | 7 days ending at the anchor, oldest first | no             |
//! | `month` | every day of the anchor's month           | yes            |
//! | `year`  | the 12 months of the anchor's year        | yes            |
//! | `all`   | none; totals and all-time averages only   | yes            |

use crate::libs::book::{Book, BookStatus};
use crate::libs::config::GoalsConfig;
use crate::libs::session::SessionRecord;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all time",
        };
        write!(f, "{name}")
    }
}

/// One aggregation unit covering `first..=last`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub pages: u64,
    pub seconds: u64,
    pub sessions: u64,
    /// Books whose finish date falls in the bucket; only counted for
    /// month and year buckets.
    pub books_finished: u64,
}

impl Bucket {
    fn new(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            first,
            last,
            pages: 0,
            seconds: 0,
            sessions: 0,
            books_finished: 0,
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

/// Derived figures for the whole history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllTimeStats {
    pub books_completed: u64,
    pub pages_per_hour: f64,
    pub pages_per_session: f64,
    pub seconds_per_session: u64,
    pub seconds_per_page: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub period: Period,
    pub anchor: NaiveDate,
    pub buckets: Vec<Bucket>,
    pub total_pages: u64,
    pub total_seconds: u64,
    pub total_sessions: u64,
    pub books_finished: u64,
    pub all_time: Option<AllTimeStats>,
}

/// Calendar day of an instant in `offset`.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Aggregates `sessions` (and `books` for finish counts) over `period`.
pub fn stats_for_period(period: Period, anchor: NaiveDate, offset: FixedOffset, sessions: &[SessionRecord], books: &[Book]) -> PeriodStats {
    if period == Period::All {
        return all_time(anchor, sessions, books);
    }

    let mut buckets = buckets_for(period, anchor);
    let counts_books = matches!(period, Period::Month | Period::Year);

    for session in sessions {
        let date = local_date(session.start_time, offset);
        if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(date)) {
            bucket.pages += session.pages_read as u64;
            bucket.seconds += session.duration_secs();
            bucket.sessions += 1;
        }
    }

    if counts_books {
        for finished in books.iter().filter_map(|b| b.date_finished) {
            let date = local_date(finished, offset);
            if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(date)) {
                bucket.books_finished += 1;
            }
        }
    }

    PeriodStats {
        period,
        anchor,
        total_pages: buckets.iter().map(|b| b.pages).sum(),
        total_seconds: buckets.iter().map(|b| b.seconds).sum(),
        total_sessions: buckets.iter().map(|b| b.sessions).sum(),
        books_finished: buckets.iter().map(|b| b.books_finished).sum(),
        buckets,
        all_time: None,
    }
}

fn buckets_for(period: Period, anchor: NaiveDate) -> Vec<Bucket> {
    match period {
        Period::Day => vec![Bucket::new(anchor, anchor)],
        Period::Week => (0..7)
            .rev()
            .map(|back| {
                let day = anchor - Duration::days(back);
                Bucket::new(day, day)
            })
            .collect(),
        Period::Month => {
            let first = anchor.with_day(1).unwrap_or(anchor);
            let last = last_day_of_month(anchor.year(), anchor.month()).unwrap_or(anchor);
            first.iter_days().take_while(|d| *d <= last).map(|d| Bucket::new(d, d)).collect()
        }
        Period::Year => (1..=12)
            .filter_map(|month| {
                let first = NaiveDate::from_ymd_opt(anchor.year(), month, 1)?;
                let last = last_day_of_month(anchor.year(), month)?;
                Some(Bucket::new(first, last))
            })
            .collect(),
        Period::All => Vec::new(),
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn all_time(anchor: NaiveDate, sessions: &[SessionRecord], books: &[Book]) -> PeriodStats {
    let total_pages: u64 = sessions.iter().map(|s| s.pages_read as u64).sum();
    let total_seconds: u64 = sessions.iter().map(|s| s.duration_secs()).sum();
    let total_sessions = sessions.len() as u64;
    let books_completed = books
        .iter()
        .filter(|b| matches!(b.status, BookStatus::Finished | BookStatus::Archived) && b.date_finished.is_some())
        .count() as u64;

    let pages_per_hour = if total_seconds > 0 {
        round1(total_pages as f64 / (total_seconds as f64 / 3600.0))
    } else {
        0.0
    };
    let pages_per_session = if total_sessions > 0 {
        round1(total_pages as f64 / total_sessions as f64)
    } else {
        0.0
    };
    let seconds_per_session = total_seconds.checked_div(total_sessions).unwrap_or(0);
    let seconds_per_page = total_seconds.checked_div(total_pages).unwrap_or(0);

    PeriodStats {
        period: Period::All,
        anchor,
        buckets: Vec::new(),
        total_pages,
        total_seconds,
        total_sessions,
        books_finished: books_completed,
        all_time: Some(AllTimeStats {
            books_completed,
            pages_per_hour,
            pages_per_session,
            seconds_per_session,
            seconds_per_page,
        }),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Progress towards one goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u64,
    pub target: u64,
    /// Percent of the target reached, capped at 100.
    pub percent: u8,
}

impl Progress {
    pub fn new(current: u64, target: u64) -> Self {
        let percent = if target == 0 {
            100
        } else {
            ((current as f64 / target as f64) * 100.0).round().min(100.0) as u8
        };
        Self { current, target, percent }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub daily_pages: Progress,
    pub weekly_pages: Progress,
    pub monthly_books: Progress,
    pub yearly_books: Progress,
}

/// Measures the configured goals against the history around `anchor`.
pub fn goal_progress(goals: &GoalsConfig, anchor: NaiveDate, offset: FixedOffset, sessions: &[SessionRecord], books: &[Book]) -> GoalProgress {
    let day = stats_for_period(Period::Day, anchor, offset, sessions, books);
    let week = stats_for_period(Period::Week, anchor, offset, sessions, books);
    let month = stats_for_period(Period::Month, anchor, offset, sessions, books);
    let year = stats_for_period(Period::Year, anchor, offset, sessions, books);

    GoalProgress {
        daily_pages: Progress::new(day.total_pages, goals.daily_pages),
        weekly_pages: Progress::new(week.total_pages, goals.weekly_pages),
        monthly_books: Progress::new(month.books_finished, goals.monthly_books),
        yearly_books: Progress::new(year.books_finished, goals.yearly_books),
    }
}
