//!
//! Bitcoin block
//!
//! Blocks are read from bitcoin-core style blk files, where each block is
//! preceded by a magic number and its size. The header is kept as the raw
//! 80 bytes it was read as; the identity hash is computed over exactly
//! those bytes.

use std::fmt;
use std::io;

use crate::error::{Error, Result};
use crate::hash::*;
use crate::network_encoding::*;
use crate::transaction::Transaction;

/// Magic number stored at the start of each block
pub const MAGIC: u32 = 0xD9B4BEF9;

pub const HEADER_SIZE: usize = 80;


/// BlockHeader represents the header of a block
#[derive(Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub raw: [u8; HEADER_SIZE],
}

impl BlockHeader {

    pub fn new(raw: [u8; HEADER_SIZE]) -> BlockHeader {
        BlockHeader { raw }
    }

    /// The identity of the block: double-SHA256 of the raw header
    pub fn hash(&self) -> Hash {
        double_sha256(&self.raw)
    }

    /// Identity hash of the parent, at offset 4
    pub fn prev_hash(&self) -> Hash {
        hash_from_slice(&self.raw[4..36])
    }

    pub fn version(&self) -> u32 {
        self.field_u32(0)
    }

    pub fn merkle_root(&self) -> Hash {
        hash_from_slice(&self.raw[36..68])
    }

    pub fn time(&self) -> u32 {
        self.field_u32(68)
    }

    pub fn bits(&self) -> u32 {
        self.field_u32(72)
    }

    pub fn nonce(&self) -> u32 {
        self.field_u32(76)
    }

    fn field_u32(&self, offset: usize) -> u32 {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.raw[offset..offset + 4]);
        u32::from_le_bytes(bytes)
    }
}

impl NetworkEncoding for BlockHeader {
    fn decode<R: io::Read>(rdr: &mut R, _max_length: u64) -> Result<BlockHeader> {
        let mut raw = [0; HEADER_SIZE];
        rdr.read_exact(&mut raw)?;
        Ok(BlockHeader { raw })
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.raw);
    }
}

impl fmt::Debug for BlockHeader {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Header {:?} prev={:?} time={}",
               HashDisplay(&self.hash()), HashDisplay(&self.prev_hash()), self.time())
    }
}


/// Decoded block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub txs:    Vec<Transaction>,
}

impl NetworkEncoding for Block {
    fn decode<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<Block> {
        Ok(Block {
            header: BlockHeader::decode(rdr, max_length)?,
            txs:    Vec::decode(rdr, max_length)?,
        })
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        self.header.encode(buffer);
        self.txs.encode(buffer);
    }
}


/// A block with the size it was declared with in the blk file
#[derive(Debug)]
pub struct FramedBlock {
    pub declared_size: u32,
    pub block:         Block,
}

/// Reads one byte, retrying on interrupts; returns None at end of input
fn read_byte<R: io::Read>(rdr: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8];
    loop {
        match rdr.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

/// Reads the magic number at a record boundary
///
/// Bitcoin-core preallocates blk files, so zero words may follow the last
/// record; these are skipped a whole word at a time. Running out of input
/// before a record starts is the clean `EndOfStream`, as is a zero tail
/// shorter than a word.
fn read_magic<R: io::Read>(rdr: &mut R) -> Result<u32> {
    loop {
        let mut word = [0u8; 4];
        for n in 0..word.len() {
            match read_byte(rdr)? {
                Some(b) => word[n] = b,
                None if word[..n].iter().all(|&b| b == 0) => return Err(Error::EndOfStream),
                None => return Err(Error::TruncatedInput),
            }
        }

        match u32::from_le_bytes(word) {
            0     => continue,
            magic => return Ok(magic),
        }
    }
}

/// Reads a block from a blk file as used by
/// bitcoin-core and various other implementations
///
/// The declared size is returned but not checked against the bytes decoded.
pub fn read_block<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<FramedBlock> {

    let magic = read_magic(rdr)?;
    if magic != MAGIC {
        return Err(Error::BadMagic(magic));
    }

    let declared_size = u32::decode(rdr, max_length)?;
    let block = Block::decode(rdr, max_length)?;

    Ok(FramedBlock { declared_size, block })
}

/// Writes a block with its magic and size, as stored in a blk file
pub fn write_block(buffer: &mut Vec<u8>, block: &Block) {
    let mut content = Vec::new();
    block.encode(&mut content);

    MAGIC.encode(buffer);
    (content.len() as u32).encode(buffer);
    buffer.extend_from_slice(&content);
}
