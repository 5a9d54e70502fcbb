//!
//! Store backed by a single SQLite table
//!
//! Batches are written in one SQL transaction, so either all of their
//! writes are visible after a crash or none are.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{Store, StoreError, WriteBatch};

const CREATE_TABLE: &'static str = "
    CREATE TABLE IF NOT EXISTS kv (
        key   BLOB PRIMARY KEY,
        value BLOB NOT NULL
    );";

const SELECT_VALUE: &'static str = "SELECT value FROM kv WHERE key = ?1";
const UPSERT_VALUE: &'static str = "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {

    /// Opens or creates the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SqliteStore, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(CREATE_TABLE)?;
        debug!("Opened store {}", path.as_ref().display());
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<SqliteStore, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(SqliteStore { conn })
    }
}

impl Store for SqliteStore {

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let mut stmt = self.conn.prepare_cached(SELECT_VALUE)?;
        let value = stmt
            .query_row(params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare_cached(UPSERT_VALUE)?;
        stmt.execute(params![key, value])?;
        Ok(())
    }

    fn write(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT_VALUE)?;
            for (key, value) in batch.into_puts() {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
