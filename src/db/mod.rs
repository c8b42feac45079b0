//! Database layer for bookking.
//!
//! A single SQLite file holds three things: the `kv` table backing the
//! timer and screen-state keys, and the `books` and `sessions` tables
//! behind the library.
//!
//! ## Usage
//!
//! ```rust
//! use bookking::db::{db::Db, kv::SqliteStore, library::SqliteLibrary};
//! use bookking::libs::store::KeyValueStore;
//!
//! let db = Db::open_in_memory()?;
//! let store = SqliteStore::new(&db);
//! store.set("timer_active", "true")?;
//! let library = SqliteLibrary::new(&db);
//! # let _ = library;
//! # Ok::<(), bookking::libs::error::TrackerError>(())
//! ```

/// Connection setup and migration on open.
pub mod db;

/// Durable key-value store on the `kv` table.
pub mod kv;

/// Books and sessions.
pub mod library;

/// Versioned schema migrations.
pub mod migrations;
