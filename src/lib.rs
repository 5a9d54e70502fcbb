//!
//! Indexes the blocks of bitcoin-core blk files
//!
//! Blocks are decoded from the blk files in file order, linked to the tip
//! of the index by their previous-hash and stored as block-hash to height.
//! The position in the files is stored with every block so that a next run
//! continues where the previous one stopped.
//!
//! ```no_run
//! use blkindex::{BlkFileStream, ChainIndexer, SqliteStore, IngestOptions};
//!
//! let files = blkindex::find_blk_files("/home/user/.bitcoin/blocks").unwrap();
//! let store = SqliteStore::open("blkindex.db").unwrap();
//! let mut indexer = ChainIndexer::open(store).unwrap();
//! let mut stream = BlkFileStream::new(files);
//!
//! blkindex::ingest(&mut indexer, &mut stream, &IngestOptions::default()).unwrap();
//! ```

#[macro_use]
extern crate log;
extern crate byteorder;
extern crate ring;
extern crate rusqlite;

pub mod error;
pub mod hash;
pub mod util;
pub mod network_encoding;
pub mod transaction;
pub mod block;
pub mod blk_file;
pub mod store;
pub mod record;
pub mod chain_index;
pub mod ingest;

pub use crate::error::{Error, Result};
pub use crate::hash::{Hash, HashDisplay, double_sha256};
pub use crate::block::{Block, BlockHeader, FramedBlock, read_block, write_block, MAGIC};
pub use crate::transaction::{Transaction, TxInput, TxOutput, Script};
pub use crate::network_encoding::NetworkEncoding;
pub use crate::blk_file::{BlkFileStream, find_blk_files};
pub use crate::store::{Store, StoreError, WriteBatch, MemoryStore, SqliteStore};
pub use crate::chain_index::{ChainIndexer, ChainState};
pub use crate::ingest::{ingest, IngestOptions, IngestSummary};
