use std::collections::HashMap;

use super::{Store, StoreError, WriteBatch};

/// Store that lives in a HashMap
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {

    pub fn new() -> MemoryStore {
        MemoryStore { values: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Store for MemoryStore {

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.values.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn write(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        self.values.extend(batch.into_puts());
        Ok(())
    }
}
