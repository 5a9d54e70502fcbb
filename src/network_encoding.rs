//! Primitives of the bitcoin network encoding
//!
//! All decoding reads from an `io::Read` so that blocks can be decoded
//! straight from the blk-file stream. Integers are little-endian.
//!
//! A compact size is a 1-byte prefix optionally followed by a 2, 4 or 8 byte
//! payload. Non-minimal encodings are accepted.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::hash::read_hash;

/// Default bound on declared lengths and counts
pub const DEFAULT_MAX_LENGTH: u64 = 32 * 1024 * 1024;

/// Reads a compact size and returns the value with the number of bytes it used
pub fn read_compact_size<R: io::Read>(rdr: &mut R) -> Result<(u64, usize)> {
    let byte1 = rdr.read_u8()?;
    Ok(match byte1 {
        0xff => (rdr.read_u64::<LittleEndian>()?, 9),
        0xfe => (rdr.read_u32::<LittleEndian>()? as u64, 5),
        0xfd => (rdr.read_u16::<LittleEndian>()? as u64, 3),
        _    => (byte1 as u64, 1),
    })
}

/// Rejects lengths above `max`
pub fn check_length(length: u64, max: u64) -> Result<usize> {
    if length > max {
        return Err(Error::ExcessiveLength { length, max });
    }
    Ok(length as usize)
}

/// Reads a compact size used as element count of a sequence
///
/// Every element takes at least one byte, so the length bound applies
pub fn read_count<R: io::Read>(rdr: &mut R, max: u64) -> Result<usize> {
    let (count, _) = read_compact_size(rdr)?;
    check_length(count, max)
}

/// Reads a compact size prefixed byte string
pub fn read_compact_size_bytes<R: io::Read>(rdr: &mut R, max: u64) -> Result<Vec<u8>> {
    let (length, _) = read_compact_size(rdr)?;
    let length = check_length(length, max)?;

    let mut result = vec![0; length];
    rdr.read_exact(&mut result)?;
    Ok(result)
}

pub fn encode_compact_size(buffer: &mut Vec<u8>, value: u64) {
    if value < 0xFD {
        buffer.push(value as u8);
    }
    else if value <= 0xFFFF {
        buffer.push(0xFD);
        buffer.extend_from_slice(&(value as u16).to_le_bytes());
    }
    else if value <= 0xFFFF_FFFF {
        buffer.push(0xFE);
        buffer.extend_from_slice(&(value as u32).to_le_bytes());
    }
    else {
        buffer.push(0xFF);
        buffer.extend_from_slice(&value.to_le_bytes());
    }
}

/// Encodes a byte string with its compact size prefix
pub fn encode_compact_size_bytes(buffer: &mut Vec<u8>, bytes: &[u8]) {
    encode_compact_size(buffer, bytes.len() as u64);
    buffer.extend_from_slice(bytes);
}

/// Vectors are never preallocated beyond this many elements; a corrupt
/// count then fails on the first missing element instead of on allocation
const PREALLOC_LIMIT: usize = 1024;

/// Trait implemented for types that can decode themselves from a reader
/// and write themselves to a vec in network encoding format
///
/// `max_length` bounds every declared length and count read on the way
pub trait NetworkEncoding
    where Self: Sized
{
    fn decode<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<Self>;
    fn encode(&self, buffer: &mut Vec<u8>);
}

impl<T: NetworkEncoding> NetworkEncoding for Vec<T> {

    /// Decodes a compact-size prefixed vector
    fn decode<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<Vec<T>> {
        let count = read_count(rdr, max_length)?;
        let mut result: Vec<T> = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            result.push(T::decode(rdr, max_length)?);
        }
        Ok(result)
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        encode_compact_size(buffer, self.len() as u64);
        for itm in self {
            itm.encode(buffer);
        }
    }
}

impl NetworkEncoding for [u8; 32] {
    fn decode<R: io::Read>(rdr: &mut R, _max_length: u64) -> Result<[u8; 32]> {
        read_hash(rdr)
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self[..]);
    }
}

macro_rules! impl_encoding_primitive {
    ($prim_type: ty, $read_method: ident) =>

    (
        impl NetworkEncoding for $prim_type {
            fn decode<R: io::Read>(rdr: &mut R, _max_length: u64) -> Result<$prim_type> {
                Ok(rdr.$read_method::<LittleEndian>()?)
            }

            fn encode(&self, buffer: &mut Vec<u8>) {
                buffer.extend_from_slice(&self.to_le_bytes());
            }
        }
    )
}

impl_encoding_primitive!(u32, read_u32);
impl_encoding_primitive!(i32, read_i32);
impl_encoding_primitive!(u64, read_u64);
impl_encoding_primitive!(i64, read_i64);


#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<(u64, usize)> {
        read_compact_size(&mut io::Cursor::new(bytes))
    }

    #[test]
    fn test_compact_size_tiers() {
        let cases: &[(u64, usize)] = &[
            (0, 1),
            (0xfc, 1),
            (0xfd, 3),
            (0xffff, 3),
            (0x10000, 5),
            (0xffff_ffff, 5),
            (0x1_0000_0000, 9),
        ];

        for &(value, size) in cases {
            let mut buf = Vec::new();
            encode_compact_size(&mut buf, value);
            assert_eq!(buf.len(), size, "encoded size of {:x}", value);
            assert_eq!(decode(&buf).unwrap(), (value, size));
        }
    }

    #[test]
    fn test_non_canonical() {
        // 5 in a 16-bit payload is accepted
        assert_eq!(decode(&[0xfd, 0x05, 0x00]).unwrap(), (5, 3));
        assert_eq!(decode(&[0xff, 1, 0, 0, 0, 0, 0, 0, 0]).unwrap(), (1, 9));
    }

    #[test]
    fn test_compact_size_truncated() {
        for bytes in &[&[][..], &[0xfd, 0x01][..], &[0xfe, 1, 2, 3][..], &[0xff; 8][..]] {
            match decode(bytes) {
                Err(Error::TruncatedInput) => (),
                other => panic!("expected truncation for {:?}, got {:?}", bytes, other),
            }
        }
    }

    #[test]
    fn test_bytes() {
        let mut buf = Vec::new();
        encode_compact_size_bytes(&mut buf, &[17u8; 0xBEEF]);
        let mut rdr = io::Cursor::new(&buf);
        let bytes = read_compact_size_bytes(&mut rdr, DEFAULT_MAX_LENGTH).unwrap();
        assert_eq!(bytes.len(), 0xBEEF);
        assert_eq!(rdr.position() as usize, buf.len());

        // one byte short
        buf.pop();
        match read_compact_size_bytes(&mut io::Cursor::new(&buf), DEFAULT_MAX_LENGTH) {
            Err(Error::TruncatedInput) => (),
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_primitive() {
        let x = [0xff_u8, 0x00_u8, 0x00_u8, 0x00_u8, 0x01_u8];
        let mut rdr = io::Cursor::new(&x[..]);

        assert_eq!(u32::decode(&mut rdr, DEFAULT_MAX_LENGTH).unwrap(), 0xff_u32);
        assert_eq!(rdr.position(), 4);

        let mut buf = Vec::new();
        (-1i64).encode(&mut buf);
        assert_eq!(buf, vec![0xff; 8]);
    }

    #[test]
    fn test_vec() {
        let mut buf = Vec::new();
        vec![1u32, 2u32].encode(&mut buf);
        assert_eq!(buf, vec![2, 1, 0, 0, 0, 2, 0, 0, 0]);

        let v: Vec<u32> = Vec::decode(&mut io::Cursor::new(&buf), DEFAULT_MAX_LENGTH).unwrap();
        assert_eq!(v, vec![1, 2]);

        // a count far beyond the data fails on the data, not on allocation
        let buf = [0xfe, 0xff, 0xff, 0xff, 0x00, 1, 0, 0, 0];
        match Vec::<u32>::decode(&mut io::Cursor::new(&buf[..]), DEFAULT_MAX_LENGTH) {
            Err(Error::TruncatedInput) => (),
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_excessive_length() {
        // declares 4GB without any payload
        let buf = [0xfe, 0xff, 0xff, 0xff, 0xff];
        match read_compact_size_bytes(&mut io::Cursor::new(&buf[..]), 1000) {
            Err(Error::ExcessiveLength { length, max }) => {
                assert_eq!(length, 0xffff_ffff);
                assert_eq!(max, 1000);
            },
            other => panic!("expected excessive length, got {:?}", other),
        }

        match read_count(&mut io::Cursor::new(&[0xfd, 0xe9, 0x03][..]), 1000) {
            Err(Error::ExcessiveLength { length: 1001, .. }) => (),
            other => panic!("expected excessive length, got {:?}", other),
        }
        assert_eq!(read_count(&mut io::Cursor::new(&[0xfd, 0xe8, 0x03][..]), 1000).unwrap(), 1000);
    }
}
