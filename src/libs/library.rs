//! Book and session storage seam.
//!
//! The session aggregator never touches tables directly; it goes through
//! this trait. `crate::db::library::SqliteLibrary` is the production
//! implementation.

use crate::libs::book::{Book, BookUpdate, NewBook};
use crate::libs::error::Result;
use crate::libs::session::{NewSession, SessionRecord};
use chrono::{DateTime, Utc};

/// Everything the library holds, as read in one go.
#[derive(Debug, Clone, Default)]
pub struct LibraryData {
    pub books: Vec<Book>,
    pub sessions: Vec<SessionRecord>,
}

pub trait Library {
    fn books(&self) -> Result<Vec<Book>>;
    fn book(&self, id: i64) -> Result<Option<Book>>;
    fn add_book(&self, book: &NewBook, created_at: DateTime<Utc>) -> Result<Book>;
    /// Applies the non-empty fields of `update` to book `id`.
    fn update_book(&self, id: i64, update: &BookUpdate) -> Result<()>;
    /// Appends a session and returns it with its assigned id.
    fn add_session(&self, session: &NewSession) -> Result<SessionRecord>;
    /// All sessions, or those of one book, oldest first.
    fn sessions(&self, book_id: Option<i64>) -> Result<Vec<SessionRecord>>;
    /// Deletes every book and session.
    fn clear_all(&self) -> Result<()>;

    fn data(&self) -> Result<LibraryData> {
        Ok(LibraryData {
            books: self.books()?,
            sessions: self.sessions(None)?,
        })
    }
}
