//! Hex helpers
//!
//! Hashes are stored in wire order but displayed byte-reversed,
//! hence the `_rev` variants.

use std::fmt;

use crate::hash::Hash;

#[derive(Debug, PartialEq)]
pub struct HexError;

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid hex string")
    }
}

impl ::std::error::Error for HexError {}

fn hex_digit(c: u8) -> Result<u8, HexError> {
    match c {
        b'A'..=b'F' => Ok(c - b'A' + 10),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'0'..=b'9' => Ok(c - b'0'),
        _           => Err(HexError),
    }
}

/// Parses a hex string; whitespace is ignored
pub fn from_hex(hex: &str) -> Result<Vec<u8>, HexError> {
    let digits: Vec<u8> = hex.bytes()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if digits.len() % 2 != 0 {
        return Err(HexError);
    }

    digits.chunks(2)
        .map(|pair| Ok(hex_digit(pair[0])? << 4 | hex_digit(pair[1])?))
        .collect()
}

/// Parses a hex string and reverses the bytes
pub fn from_hex_rev(hex: &str) -> Result<Vec<u8>, HexError> {
    let mut bytes = from_hex(hex)?;
    bytes.reverse();
    Ok(bytes)
}

/// Parses a hash given in display order
pub fn hash_from_hex(hex: &str) -> Result<Hash, HexError> {
    let bytes = from_hex_rev(hex)?;
    if bytes.len() != 32 {
        return Err(HexError);
    }
    let mut hash = [0; 32];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter()
        .map(|n| format!("{:02x}", n))
        .collect::<Vec<_>>()
        .concat()
}

/// Lowercase hex of the reversed bytes; the human readable form of a hash
pub fn to_hex_rev(bytes: &[u8]) -> String {
    bytes.iter()
        .rev()
        .map(|n| format!("{:02x}", n))
        .collect::<Vec<_>>()
        .concat()
}
