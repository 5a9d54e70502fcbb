//!
//! Index of the best chain
//!
//! Blocks are indexed strictly in order: each block must have the current
//! tip as its parent. The height mapping, the tip pointer and the stream
//! position after the block are written in one batch, so the store never
//! holds a resume offset beyond the blocks it has indexed.
//!
//! Blocks that do not connect to the tip are not kept as orphans; they
//! stop indexing with `ChainLinkageViolation`.

use crate::block::BlockHeader;
use crate::error::{Error, Result};
use crate::hash::{Hash, HashDisplay};
use crate::record::*;
use crate::store::{Store, StoreError, WriteBatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Nothing is indexed; the next block becomes height 0
    NoTip,
    HasTip { height: i32, hash: Hash },
}

pub struct ChainIndexer<S: Store> {
    store: S,
    state: ChainState,
}

/// Reads the persisted resume offset, 0 if none is stored
pub fn resume_offset<S: Store>(store: &S) -> Result<u64> {
    let mut offset = ResumeOffset(0);
    store.get_record(&mut offset)?;

    if offset.0 < 0 {
        return Err(StoreError::CorruptValue { key: offset.key() }.into());
    }
    Ok(offset.0 as u64)
}

/// Reads the persisted tip and its height
pub fn load_state<S: Store>(store: &S) -> Result<ChainState> {
    let mut tip = Tip::default();
    if !store.get_record(&mut tip)? {
        return Ok(ChainState::NoTip);
    }

    let mut height = BlockHeight::lookup(tip.0);
    if !store.get_record(&mut height)? {
        return Err(StoreError::MissingRecord { key: height.key() }.into());
    }

    Ok(ChainState::HasTip { height: height.height, hash: tip.0 })
}

impl<S: Store> ChainIndexer<S> {

    /// Opens the indexer on a store; the tip is read once and then
    /// tracked in memory
    pub fn open(store: S) -> Result<ChainIndexer<S>> {
        let state = load_state(&store)?;
        match state {
            ChainState::NoTip =>
                info!("Empty index"),
            ChainState::HasTip { height, ref hash } =>
                info!("Index tip at height {}: {}", height, HashDisplay(hash)),
        }

        Ok(ChainIndexer { store, state })
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Height and hash of the tip
    pub fn tip(&self) -> Option<(i32, Hash)> {
        match self.state {
            ChainState::NoTip => None,
            ChainState::HasTip { height, hash } => Some((height, hash)),
        }
    }

    /// Looks up the height of an indexed block
    pub fn height_of(&self, hash: &Hash) -> Result<Option<i32>> {
        let mut record = BlockHeight::lookup(*hash);
        if self.store.get_record(&mut record)? {
            Ok(Some(record.height))
        } else {
            Ok(None)
        }
    }

    pub fn resume_offset(&self) -> Result<u64> {
        resume_offset(&self.store)
    }

    /// Adds a block on top of the tip
    ///
    /// `resume_offset` is the stream position just after the block; it is
    /// committed together with the height and the new tip.
    /// Returns the height of the block.
    pub fn index_block(&mut self, header: &BlockHeader, resume_offset: u64) -> Result<i32> {
        let hash = header.hash();
        let prev_hash = header.prev_hash();

        let height = match self.state {
            ChainState::NoTip => 0,
            ChainState::HasTip { height, hash: tip } if tip == prev_hash => height + 1,
            ChainState::HasTip { hash: tip, .. } => {
                error!("Block {} does not connect to tip {}; needs orphanizing",
                       HashDisplay(&hash), HashDisplay(&tip));
                return Err(Error::ChainLinkageViolation { hash, prev_hash, tip });
            }
        };

        let mut batch = WriteBatch::new();
        batch.put_record(&BlockHeight { hash, height });
        batch.put_record(&Tip(hash));
        batch.put_record(&ResumeOffset(resume_offset as i64));
        self.store.write(batch)?;

        trace!("Indexed {} at height {}", HashDisplay(&hash), height);
        self.state = ChainState::HasTip { height, hash };
        Ok(height)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
