
// Record layout
// -------------
//
// RESUME OFFSET:
// key    "processed-offset"
// value  i64 little-endian; stream position of the next block
//
// TIP:
// key    "tip"
// value  32 raw hash bytes, wire order
//
// BLOCK HEIGHT:
// key    "idx-" ++ 32 raw hash bytes
// value  i32 little-endian

use std::io;

use crate::hash::Hash;
use crate::network_encoding::{NetworkEncoding, DEFAULT_MAX_LENGTH};
use crate::store::StoreError;

pub const KEY_RESUME_OFFSET: &'static [u8] = b"processed-offset";
pub const KEY_TIP: &'static [u8] = b"tip";
pub const PREFIX_BLOCK_HEIGHT: &'static [u8] = b"idx-";

/// A value stored under a fixed key layout
pub trait Record {
    fn key(&self) -> Vec<u8>;
    fn encode_value(&self) -> Vec<u8>;

    /// Replaces the value part of `self`; the key part is left as is
    fn decode_value(&mut self, value: &[u8]) -> Result<(), StoreError>;
}

/// Decodes `value` as a `T` that must use all of its bytes
fn decode_exact<T: NetworkEncoding>(key: Vec<u8>, value: &[u8]) -> Result<T, StoreError> {
    let mut rdr = io::Cursor::new(value);
    match T::decode(&mut rdr, DEFAULT_MAX_LENGTH) {
        Ok(result) if rdr.position() as usize == value.len() => Ok(result),
        _ => Err(StoreError::CorruptValue { key }),
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResumeOffset(pub i64);

impl Record for ResumeOffset {
    fn key(&self) -> Vec<u8> {
        KEY_RESUME_OFFSET.to_vec()
    }

    fn encode_value(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8);
        self.0.encode(&mut buf);
        buf
    }

    fn decode_value(&mut self, value: &[u8]) -> Result<(), StoreError> {
        self.0 = decode_exact(self.key(), value)?;
        Ok(())
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tip(pub Hash);

impl Record for Tip {
    fn key(&self) -> Vec<u8> {
        KEY_TIP.to_vec()
    }

    fn encode_value(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    fn decode_value(&mut self, value: &[u8]) -> Result<(), StoreError> {
        self.0 = decode_exact(self.key(), value)?;
        Ok(())
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeight {
    pub hash:   Hash,
    pub height: i32,
}

impl BlockHeight {

    /// A record to look up the height of `hash`
    pub fn lookup(hash: Hash) -> BlockHeight {
        BlockHeight { hash, height: -1 }
    }
}

impl Record for BlockHeight {
    fn key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(PREFIX_BLOCK_HEIGHT.len() + 32);
        key.extend_from_slice(PREFIX_BLOCK_HEIGHT);
        key.extend_from_slice(&self.hash);
        key
    }

    fn encode_value(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4);
        self.height.encode(&mut buf);
        buf
    }

    fn decode_value(&mut self, value: &[u8]) -> Result<(), StoreError> {
        self.height = decode_exact(self.key(), value)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Store};

    #[test]
    fn test_layouts() {
        let offset = ResumeOffset(0x0102);
        assert_eq!(offset.key(), b"processed-offset".to_vec());
        assert_eq!(offset.encode_value(), vec![2, 1, 0, 0, 0, 0, 0, 0]);

        let mut hash = [0; 32];
        hash[0] = 0xaa;
        let tip = Tip(hash);
        assert_eq!(tip.key(), b"tip".to_vec());
        assert_eq!(tip.encode_value(), hash.to_vec());

        let height = BlockHeight { hash, height: 7 };
        let key = height.key();
        assert_eq!(key.len(), 36);
        assert_eq!(&key[..4], b"idx-");
        assert_eq!(key[4], 0xaa);
        assert_eq!(height.encode_value(), vec![7, 0, 0, 0]);
    }

    #[test]
    fn test_store_records() {
        let mut store = MemoryStore::new();
        let hash = [3; 32];

        let mut lookup = BlockHeight::lookup(hash);
        assert!(!store.get_record(&mut lookup).unwrap());

        store.put_record(&BlockHeight { hash, height: 12 }).unwrap();
        assert!(store.get_record(&mut lookup).unwrap());
        assert_eq!(lookup.height, 12);

        store.put_record(&ResumeOffset(-1)).unwrap();
        let mut offset = ResumeOffset::default();
        assert!(store.get_record(&mut offset).unwrap());
        assert_eq!(offset, ResumeOffset(-1));
    }

    #[test]
    fn test_corrupt_value() {
        let mut store = MemoryStore::new();
        store.put(b"tip", &[1; 31]).unwrap();
        match store.get_record(&mut Tip::default()) {
            Err(StoreError::CorruptValue { key }) => assert_eq!(key, b"tip".to_vec()),
            other => panic!("expected corrupt value, got {:?}", other),
        }

        store.put(b"processed-offset", &[1; 9]).unwrap();
        match store.get_record(&mut ResumeOffset::default()) {
            Err(StoreError::CorruptValue { .. }) => (),
            other => panic!("expected corrupt value, got {:?}", other),
        }
    }
}
