//! Book and session tables.
//!
//! Implements [`Library`] on top of the shared connection. Timestamps are
//! stored as RFC 3339 text through rusqlite's chrono support.

use crate::db::db::Db;
use crate::libs::book::{Book, BookStatus, BookUpdate, NewBook};
use crate::libs::error::{Result, TrackerError};
use crate::libs::library::Library;
use crate::libs::session::{NewSession, SessionRecord};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;

const SELECT_BOOKS: &str = "SELECT id, title, author, first_page, last_page, current_page, status, date_started, date_finished, created_at FROM books";
const INSERT_BOOK: &str = "INSERT INTO books (title, author, first_page, last_page, current_page, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const UPDATE_BOOK: &str = "UPDATE books SET current_page = ?1, status = ?2, date_started = ?3, date_finished = ?4 WHERE id = ?5";

const SELECT_SESSIONS: &str =
    "SELECT id, book_id, start_time, end_time, duration_seconds, start_page, end_page, pages_read, reading_speed FROM sessions";
const INSERT_SESSION: &str = "INSERT INTO sessions (book_id, start_time, end_time, duration_seconds, start_page, end_page, pages_read, reading_speed)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const DELETE_SESSIONS: &str = "DELETE FROM sessions";
const DELETE_BOOKS: &str = "DELETE FROM books";

#[derive(Clone)]
pub struct SqliteLibrary {
    pub conn: Arc<Mutex<Connection>>,
}

impl SqliteLibrary {
    pub fn new(db: &Db) -> Self {
        Self { conn: db.conn.clone() }
    }

    fn book_from_row(row: &Row) -> rusqlite::Result<Book> {
        let status: String = row.get(6)?;
        let status = status
            .parse::<BookStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, e.into()))?;
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            first_page: row.get(3)?,
            last_page: row.get(4)?,
            current_page: row.get(5)?,
            status,
            date_started: row.get(7)?,
            date_finished: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn session_from_row(row: &Row) -> rusqlite::Result<SessionRecord> {
        let duration: Option<i64> = row.get(4)?;
        Ok(SessionRecord {
            id: row.get(0)?,
            book_id: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            duration_seconds: duration.map(|d| d.max(0) as u64),
            start_page: row.get(5)?,
            end_page: row.get(6)?,
            pages_read: row.get(7)?,
            reading_speed: row.get(8)?,
        })
    }

    /// Stores a session row exactly as given, including a missing duration.
    ///
    /// Used for importing history recorded before durations were tracked.
    pub fn import_session(&self, record: &SessionRecord) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            INSERT_SESSION,
            params![
                record.book_id,
                record.start_time,
                record.end_time,
                record.duration_seconds.map(|d| d as i64),
                record.start_page,
                record.end_page,
                record.pages_read,
                record.reading_speed,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl Library for SqliteLibrary {
    fn books(&self) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_BOOKS))?;
        let books = stmt.query_map([], Self::book_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn book(&self, id: i64) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        let book = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_BOOKS), params![id], Self::book_from_row)
            .optional()?;
        Ok(book)
    }

    fn add_book(&self, book: &NewBook, created_at: DateTime<Utc>) -> Result<Book> {
        book.validate()?;
        let id = {
            let conn = self.conn.lock();
            conn.execute(
                INSERT_BOOK,
                params![
                    book.title,
                    book.author,
                    book.first_page,
                    book.last_page,
                    book.first_page,
                    BookStatus::Reading.as_str(),
                    created_at
                ],
            )?;
            conn.last_insert_rowid()
        };
        self.book(id)?.ok_or(TrackerError::BookNotFound(id))
    }

    fn update_book(&self, id: i64, update: &BookUpdate) -> Result<()> {
        let mut book = self.book(id)?.ok_or(TrackerError::BookNotFound(id))?;
        if update.is_empty() {
            return Ok(());
        }
        update.apply_to(&mut book);

        self.conn.lock().execute(
            UPDATE_BOOK,
            params![book.current_page, book.status.as_str(), book.date_started, book.date_finished, id],
        )?;
        Ok(())
    }

    fn add_session(&self, session: &NewSession) -> Result<SessionRecord> {
        let id = {
            let conn = self.conn.lock();
            conn.execute(
                INSERT_SESSION,
                params![
                    session.book_id,
                    session.start_time,
                    session.end_time,
                    session.duration_seconds as i64,
                    session.start_page,
                    session.end_page,
                    session.pages_read,
                    session.reading_speed,
                ],
            )?;
            conn.last_insert_rowid()
        };

        Ok(SessionRecord {
            id,
            book_id: session.book_id,
            start_time: session.start_time,
            end_time: session.end_time,
            duration_seconds: Some(session.duration_seconds),
            start_page: session.start_page,
            end_page: session.end_page,
            pages_read: session.pages_read,
            reading_speed: session.reading_speed,
        })
    }

    fn sessions(&self, book_id: Option<i64>) -> Result<Vec<SessionRecord>> {
        let conn = self.conn.lock();
        let sessions = match book_id {
            Some(book_id) => {
                let mut stmt = conn.prepare(&format!("{} WHERE book_id = ?1 ORDER BY start_time, id", SELECT_SESSIONS))?;
                let rows = stmt.query_map(params![book_id], Self::session_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY start_time, id", SELECT_SESSIONS))?;
                let rows = stmt.query_map([], Self::session_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(sessions)
    }

    fn clear_all(&self) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(DELETE_SESSIONS, [])?;
        tx.execute(DELETE_BOOKS, [])?;
        tx.commit()?;
        Ok(())
    }
}
