//! SQLite-backed durable key-value store.
//!
//! Each call is one statement and therefore atomic for its key. No call
//! spans several keys, matching what the timer engine expects from its
//! store.

use crate::db::db::Db;
use crate::libs::error::Result;
use crate::libs::store::KeyValueStore;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;

const SELECT_VALUE: &str = "SELECT value FROM kv WHERE key = ?1";
const UPSERT_VALUE: &str = "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)";
const DELETE_VALUE: &str = "DELETE FROM kv WHERE key = ?1";

#[derive(Clone)]
pub struct SqliteStore {
    pub conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(db: &Db) -> Self {
        Self { conn: db.conn.clone() }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn.query_row(SELECT_VALUE, params![key], |row| row.get(0)).optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.lock().execute(UPSERT_VALUE, params![key, value])?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn.lock().execute(DELETE_VALUE, params![key])?;
        Ok(())
    }
}
