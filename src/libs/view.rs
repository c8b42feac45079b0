use super::book::Book;
use super::formatter::{format_instant, format_reading_time, format_speed};
use super::session::SessionRecord;
use super::stats::{GoalProgress, Period, PeriodStats, Progress};
use anyhow::Result;
use chrono::FixedOffset;
use prettytable::{row, Table};

/// Console tables.
pub struct View {}

impl View {
    pub fn books(books: &[Book]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "AUTHOR", "PAGES", "PROGRESS", "STATUS"]);
        for book in books {
            table.add_row(row![
                book.id,
                book.title,
                book.author,
                format!("{}-{}", book.first_page, book.last_page),
                format!("{}%", book.progress_percent()),
                book.status
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn book(book: &Book, offset: FixedOffset) -> Result<()> {
        let mut table = Table::new();
        let date = |d: Option<chrono::DateTime<chrono::Utc>>| d.map(|d| format_instant(d, offset)).unwrap_or_else(|| "-".to_string());

        table.add_row(row!["TITLE", book.title]);
        table.add_row(row!["AUTHOR", book.author]);
        table.add_row(row!["PAGES", format!("{}-{}", book.first_page, book.last_page)]);
        table.add_row(row!["NEXT PAGE", book.current_page]);
        table.add_row(row!["PROGRESS", format!("{}%", book.progress_percent())]);
        table.add_row(row!["STATUS", book.status]);
        table.add_row(row!["STARTED", date(book.date_started)]);
        table.add_row(row!["FINISHED", date(book.date_finished)]);
        table.printstd();

        Ok(())
    }

    pub fn sessions(sessions: &[SessionRecord], offset: FixedOffset) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "BOOK", "START", "PAGES", "READ", "TIME", "SPEED"]);
        for session in sessions {
            table.add_row(row![
                session.id,
                session.book_id,
                format_instant(session.start_time, offset),
                format!("{}-{}", session.start_page, session.end_page),
                session.pages_read,
                format_reading_time(session.duration_secs()),
                format_speed(session.reading_speed)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn stats(stats: &PeriodStats) -> Result<()> {
        let mut table = Table::new();
        let with_books = matches!(stats.period, Period::Month | Period::Year);

        if !stats.buckets.is_empty() {
            if with_books {
                table.add_row(row!["DATE", "PAGES", "TIME", "SESSIONS", "BOOKS"]);
            } else {
                table.add_row(row!["DATE", "PAGES", "TIME", "SESSIONS"]);
            }
            for bucket in &stats.buckets {
                let label = if stats.period == Period::Year {
                    bucket.first.format("%B").to_string()
                } else {
                    bucket.first.format("%a %d.%m").to_string()
                };
                if with_books {
                    table.add_row(row![label, bucket.pages, format_reading_time(bucket.seconds), bucket.sessions, bucket.books_finished]);
                } else {
                    table.add_row(row![label, bucket.pages, format_reading_time(bucket.seconds), bucket.sessions]);
                }
            }
        }

        if with_books {
            table.add_row(row!["TOTAL", stats.total_pages, format_reading_time(stats.total_seconds), stats.total_sessions, stats.books_finished]);
        } else {
            table.add_row(row!["TOTAL", stats.total_pages, format_reading_time(stats.total_seconds), stats.total_sessions]);
        }
        table.printstd();

        if let Some(all_time) = &stats.all_time {
            let mut table = Table::new();
            table.add_row(row!["BOOKS COMPLETED", all_time.books_completed]);
            table.add_row(row!["PAGES PER HOUR", format!("{:.1}", all_time.pages_per_hour)]);
            table.add_row(row!["PAGES PER SESSION", format!("{:.1}", all_time.pages_per_session)]);
            table.add_row(row!["TIME PER SESSION", format_reading_time(all_time.seconds_per_session)]);
            table.add_row(row!["TIME PER PAGE", format_reading_time(all_time.seconds_per_page)]);
            table.printstd();
        }

        Ok(())
    }

    pub fn goals(progress: &GoalProgress) -> Result<()> {
        let mut table = Table::new();
        let line = |p: &Progress| format!("{}/{}", p.current, p.target);

        table.add_row(row!["GOAL", "DONE", "%"]);
        table.add_row(row!["Pages today", line(&progress.daily_pages), progress.daily_pages.percent]);
        table.add_row(row!["Pages this week", line(&progress.weekly_pages), progress.weekly_pages.percent]);
        table.add_row(row!["Books this month", line(&progress.monthly_books), progress.monthly_books.percent]);
        table.add_row(row!["Books this year", line(&progress.yearly_books), progress.yearly_books.percent]);
        table.printstd();

        Ok(())
    }
}
