use crate::db::migrations::init_with_migrations;
use crate::libs::data_storage::DataStorage;
use crate::libs::error::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

pub const DB_FILE_NAME: &str = "bookking.db";

/// Shared SQLite handle with the schema migrated to the latest version.
///
/// Clones share one connection; the key-value store and the library are
/// both built from the same `Db`.
#[derive(Clone)]
pub struct Db {
    pub conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Opens `bookking.db` in the per-user data directory.
    pub fn new() -> Result<Db> {
        Self::in_storage(&DataStorage::new())
    }

    pub fn in_storage(storage: &DataStorage) -> Result<Db> {
        let db_file_path = storage.get_path(DB_FILE_NAME)?;
        Self::open(db_file_path)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Db> {
        Self::prepare(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Db> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(mut conn: Connection) -> Result<Db> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_with_migrations(&mut conn)?;
        Ok(Db {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}
