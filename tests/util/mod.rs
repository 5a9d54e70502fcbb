//!
//! Builds blk files for the integration tests
//!
//! Blocks are synthetic: headers link by previous-hash and carry a nonce
//! to make them unique; transactions are coinbase-like.

use std::fs;
use std::path::{Path, PathBuf};

use blkindex::*;

pub const BLOCK0: &'static str = "0100000000000000000000000000000000000000000000000000000000000000\
                   000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa\
                   4b1e5e4a29ab5f49ffff001d1dac2b7c01010000000100000000000000000000\
                   00000000000000000000000000000000000000000000ffffffff4d04ffff001d\
                   0104455468652054696d65732030332f4a616e2f32303039204368616e63656c\
                   6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f75742066\
                   6f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe554827\
                   1967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4\
                   f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

pub const BLOCK0_HASH: &'static str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

/// The genesis block as stored in blk00000.dat
pub fn genesis_framed() -> Vec<u8> {
    let raw = blkindex::util::from_hex(BLOCK0).unwrap();
    let mut buf = Vec::new();
    MAGIC.encode(&mut buf);
    (raw.len() as u32).encode(&mut buf);
    buf.extend_from_slice(&raw);
    buf
}

pub fn coinbase(nonce: u32, outputs: usize) -> Transaction {
    let mut script = vec![4];
    script.extend_from_slice(&nonce.to_le_bytes());

    Transaction {
        version: 1,
        txs_in: vec![TxInput {
            prev_tx_out:     [0; 32],
            prev_tx_out_idx: 0xffff_ffff,
            script:          Script(script),
            sequence:        0xffff_ffff,
        }],
        txs_out: (0..outputs).map(|n| TxOutput {
            value:     50_0000_0000 + n as u64,
            pk_script: Script(vec![0x51]),
        }).collect(),
        lock_time: 0,
    }
}

pub fn block(prev: &Hash, nonce: u32, tx_count: usize) -> Block {
    let mut raw = [0; 80];
    raw[0] = 1;
    raw[4..36].copy_from_slice(prev);
    raw[68..72].copy_from_slice(&(1_231_006_505 + nonce).to_le_bytes());
    raw[76..80].copy_from_slice(&nonce.to_le_bytes());

    Block {
        header: BlockHeader::new(raw),
        txs:    (0..tx_count).map(|n| coinbase(nonce * 1000 + n as u32, n + 1)).collect(),
    }
}

/// A chain of `count` linked blocks starting after `prev`
pub fn chain_from(prev: &Hash, first_nonce: u32, count: usize) -> Vec<Block> {
    let mut prev = *prev;
    (0..count).map(|n| {
        let blk = block(&prev, first_nonce + n as u32, 1 + n % 3);
        prev = blk.header.hash();
        blk
    }).collect()
}

pub fn chain(count: usize) -> Vec<Block> {
    chain_from(&[0; 32], 0, count)
}

/// Frames the blocks as in a blk file; also returns the offset after each block
pub fn framed(blocks: &[Block]) -> (Vec<u8>, Vec<u64>) {
    let mut buf = Vec::new();
    let mut offsets = Vec::new();
    for blk in blocks {
        write_block(&mut buf, blk);
        offsets.push(buf.len() as u64);
    }
    (buf, offsets)
}

/// Writes `data` as consecutive blk files, split at the given offsets
pub fn write_split(dir: &Path, data: &[u8], splits: &[usize]) -> Vec<PathBuf> {
    let mut bounds = vec![0];
    bounds.extend_from_slice(splits);
    bounds.push(data.len());

    bounds.windows(2).enumerate().map(|(n, w)| {
        let path = dir.join(format!("blk{:05}.dat", n));
        fs::write(&path, &data[w[0]..w[1]]).unwrap();
        path
    }).collect()
}
