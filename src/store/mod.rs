//!
//! Key/value storage of the index
//!
//! The indexer only needs point lookups, point writes and an atomic batch
//! of writes. `SqliteStore` persists to a single file; `MemoryStore` is
//! used by tests.
//!
//! What is stored under which key is defined in [`record`](../record/index.html).

use std::{error, fmt};


use crate::record::Record;

mod memory;
mod sqlite;

pub use self::memory::MemoryStore;
pub use self::sqlite::SqliteStore;

/// All StoreErrors are unrecoverable; either the backend failed or the
/// stored data is corrupted
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),

    /// A value does not have the layout of its key
    CorruptValue { key: Vec<u8> },

    /// A record another record points to is absent
    MissingRecord { key: Vec<u8> },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> StoreError {
        StoreError::Sqlite(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StoreError::Sqlite(ref err) => write!(f, "sqlite: {}", err),
            StoreError::CorruptValue { ref key } =>
                write!(f, "corrupt value for key {}", String::from_utf8_lossy(key)),
            StoreError::MissingRecord { ref key } =>
                write!(f, "missing record for key {}", String::from_utf8_lossy(key)),
        }
    }
}

impl error::Error for StoreError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            StoreError::Sqlite(ref err) => Some(err),
            _ => None,
        }
    }
}


/// A set of writes that is committed as one
#[derive(Debug, Default)]
pub struct WriteBatch {
    puts: Vec<(Vec<u8>, Vec<u8>)>,
}

impl WriteBatch {

    pub fn new() -> WriteBatch {
        WriteBatch { puts: Vec::new() }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.puts.push((key.to_vec(), value.to_vec()));
    }

    pub fn put_record<T: Record>(&mut self, record: &T) {
        self.puts.push((record.key(), record.encode_value()));
    }

    pub fn len(&self) -> usize {
        self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }

    pub fn into_puts(self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.puts
    }
}


/// Handle to the persistent key/value store
pub trait Store {

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Commits all writes of the batch atomically
    fn write(&mut self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Reads a record into `record`; returns false if it is absent
    fn get_record<T: Record>(&self, record: &mut T) -> Result<bool, StoreError>
        where Self: Sized
    {
        let key = record.key();
        match self.get(&key)? {
            None => Ok(false),
            Some(value) => {
                record.decode_value(&value)?;
                Ok(true)
            }
        }
    }

    fn put_record<T: Record>(&mut self, record: &T) -> Result<(), StoreError>
        where Self: Sized
    {
        self.put(&record.key(), &record.encode_value())
    }
}

/// A borrowed store can be passed where a store is owned, so a test can
/// reopen an indexer on the same data
impl<'a, S: Store> Store for &'a mut S {

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn write(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).write(batch)
    }
}
