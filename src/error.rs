//! Error type shared by the decoder, the blk-file stream and the indexer
//!
//! Except for `EndOfStream`, which signals a clean end of the archive at a
//! block boundary, every variant is fatal for an ingestion run.

use std::{error, fmt, io};

use crate::hash::Hash;
use crate::util::to_hex_rev;
use crate::store::StoreError;

#[derive(Debug)]
pub enum Error {
    /// The 4 bytes at a record boundary are not the blk-file magic
    BadMagic(u32),

    /// Fewer bytes remain than the structure being decoded declares
    TruncatedInput,

    /// A declared length or count exceeds the configured sanity bound
    ExcessiveLength { length: u64, max: u64 },

    /// All archive files are exhausted
    EndOfStream,

    /// The stored resume offset lies past the end of the archive files
    ResumeBeyondEnd { offset: u64, end: u64 },

    /// The previous-hash of a block does not match the current tip
    ChainLinkageViolation { hash: Hash, prev_hash: Hash, tip: Hash },

    Store(StoreError),
    Io(io::Error),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// True for the normal termination signal
    pub fn is_end_of_stream(&self) -> bool {
        match *self {
            Error::EndOfStream => true,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BadMagic(magic) =>
                write!(f, "incorrect magic number 0x{:08x}", magic),
            Error::TruncatedInput =>
                f.write_str("unexpected end of input inside a block"),
            Error::ExcessiveLength { length, max } =>
                write!(f, "declared length {} exceeds maximum of {}", length, max),
            Error::EndOfStream =>
                f.write_str("end of archive stream"),
            Error::ResumeBeyondEnd { offset, end } =>
                write!(f, "resume offset {} is beyond the end of the blk files at {}", offset, end),
            Error::ChainLinkageViolation { ref hash, ref prev_hash, ref tip } =>
                write!(f, "block {} has previous hash {} but the tip is {}; needs orphanizing",
                       to_hex_rev(hash), to_hex_rev(prev_hash), to_hex_rev(tip)),
            Error::Store(ref err) => write!(f, "store error: {}", err),
            Error::Io(ref err)    => write!(f, "io error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Store(ref err) => Some(err),
            Error::Io(ref err)    => Some(err),
            _ => None,
        }
    }
}

/// An unexpected EOF can only come from `read_exact` inside a structure;
/// clean ends at a record boundary are detected before that
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::TruncatedInput
        } else {
            Error::Io(err)
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Error {
        Error::Store(err)
    }
}
