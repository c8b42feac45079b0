//! Typed errors for the reading-tracker core.
//!
//! Every fallible operation in the timer, screen-state and session layers
//! returns [`TrackerError`]. Command handlers wrap it into `anyhow::Error`
//! with `?`, so the typed variants stay available to library users while
//! the CLI only needs to print them.
//!
//! Corrupt persisted state is the one kind the core never hands back from
//! recovery paths: it is logged, the offending key is removed, and the
//! operation continues as if nothing had been stored.

use crate::libs::book::BookStatus;
use thiserror::Error;

/// Errors produced by the reading-tracker core.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// `start()` was called while a run is still open.
    #[error("a reading run is already active")]
    RunAlreadyActive,

    /// The operation needs an open run and there is none.
    #[error("no reading run is active")]
    NoActiveRun,

    #[error("the reading run is already paused")]
    AlreadyPaused,

    #[error("the reading run is not paused")]
    NotPaused,

    /// The end page lies outside the book or before the current page.
    #[error("invalid page range: {0}")]
    InvalidPageRange(String),

    /// A manually entered session has inconsistent timestamps.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("book {0} not found")]
    BookNotFound(i64),

    /// A book status change outside the legal transition table.
    #[error("cannot change book status from {from} to {to}")]
    IllegalTransition { from: BookStatus, to: BookStatus },

    /// A persisted entry could not be parsed.
    #[error("corrupt persisted state under '{key}': {reason}")]
    CorruptPersistedState { key: String, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, TrackerError>;
