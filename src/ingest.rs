//!
//! The ingestion loop
//!
//! Resumes the blk-file stream at the persisted offset, then decodes and
//! indexes one block at a time until the stream ends. A clean end of the
//! stream is the only normal way out; every other error aborts the run and
//! leaves the store at the last fully indexed block.

use crate::blk_file::BlkFileStream;
use crate::block::read_block;
use crate::chain_index::ChainIndexer;
use crate::error::{Error, Result};
use crate::hash::{Hash, HashDisplay};
use crate::network_encoding::DEFAULT_MAX_LENGTH;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Bound on declared lengths and counts within a block
    pub max_length: u64,

    /// Log progress every this many heights; 0 disables it
    pub progress_interval: u32,
}

impl Default for IngestOptions {
    fn default() -> IngestOptions {
        IngestOptions {
            max_length:        DEFAULT_MAX_LENGTH,
            progress_interval: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Blocks indexed by this run
    pub blocks:       u64,
    pub start_offset: u64,
    pub end_offset:   u64,
    pub tip:          Option<(i32, Hash)>,
}

/// Indexes all blocks from the stream's resume offset to its end
///
/// The stream must be freshly opened, at position 0. A stored offset
/// beyond the end of the files is `ResumeBeyondEnd`, as the files no longer
/// match the index.
pub fn ingest<S: Store>(indexer: &mut ChainIndexer<S>,
                        stream: &mut BlkFileStream,
                        options: &IngestOptions) -> Result<IngestSummary> {

    let start_offset = indexer.resume_offset()?;
    info!("Resuming at stream offset {}", start_offset);

    match stream.skip(start_offset) {
        Ok(_) => (),
        Err(Error::EndOfStream) => {
            error!("Cannot skip to offset {}; stream ends at {}", start_offset, stream.position());
            return Err(Error::ResumeBeyondEnd { offset: start_offset, end: stream.position() });
        },
        Err(err) => return Err(err),
    }

    let mut blocks = 0;
    let mut end_offset = start_offset;
    loop {
        let framed = match read_block(stream, options.max_length) {
            Ok(framed) => framed,
            Err(Error::EndOfStream) => break,
            Err(err) => {
                error!("Failed to read block at stream offset {}: {}", end_offset, err);
                return Err(err);
            }
        };

        let height = indexer.index_block(&framed.block.header, stream.position())?;
        end_offset = stream.position();
        blocks += 1;

        if options.progress_interval > 0 && height % options.progress_interval as i32 == 0 {
            info!("Height {} {} ({} txs, offset {})",
                  height, HashDisplay(&framed.block.header.hash()), framed.block.txs.len(), end_offset);
        }
    }

    let summary = IngestSummary {
        blocks,
        start_offset,
        end_offset,
        tip: indexer.tip(),
    };
    info!("Indexed {} blocks; stream offset {} -> {}", blocks, start_offset, end_offset);
    Ok(summary)
}
