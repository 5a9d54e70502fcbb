//! Hashing functions
//!
//! A `Hash` is an owned 32-byte value in wire order. Use
//! `util::to_hex_rev` or `HashDisplay` to show it.

use std::fmt;
use std::io;

use ring;

use crate::error::Result;

pub type Hash = [u8; 32];

/// Copies the first 32 bytes of a slice into an owned hash
pub fn hash_from_slice(slice: &[u8]) -> Hash {
    let mut result = [0; 32];
    result.copy_from_slice(&slice[0..32]);
    result
}

/// Hashes the input twice with SHA256
pub fn double_sha256(input: &[u8]) -> Hash {
    let digest1 = ring::digest::digest(&ring::digest::SHA256, input);
    let digest2 = ring::digest::digest(&ring::digest::SHA256, digest1.as_ref());

    hash_from_slice(digest2.as_ref())
}

/// Reads exactly 32 bytes in stream order
pub fn read_hash<R: io::Read>(rdr: &mut R) -> Result<Hash> {
    let mut hash = [0; 32];
    rdr.read_exact(&mut hash)?;
    Ok(hash)
}

/// Formats a hash byte-reversed as lowercase hex
pub struct HashDisplay<'a>(pub &'a Hash);

impl<'a> fmt::Display for HashDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0.iter().rev() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl<'a> fmt::Debug for HashDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
