//!
//! Bitcoin transaction
//!
//! Transactions are decoded for their structure only; scripts are kept
//! as opaque bytes and nothing is validated.

use std::fmt;
use std::io;

use crate::error::Result;
use crate::hash::{Hash, HashDisplay};
use crate::network_encoding::*;

/// A compact-size prefixed, uninterpreted script
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Script(pub Vec<u8>);

impl fmt::Debug for Script {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Script({} bytes)", self.0.len())
    }
}

impl NetworkEncoding for Script {
    fn decode<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<Script> {
        Ok(Script(read_compact_size_bytes(rdr, max_length)?))
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        encode_compact_size_bytes(buffer, &self.0);
    }
}


/// A transaction as it is found in a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version:   u32,
    pub txs_in:    Vec<TxInput>,
    pub txs_out:   Vec<TxOutput>,
    pub lock_time: u32,
}

impl NetworkEncoding for Transaction {

    /// Decodes the fields in order; there is no backtracking
    fn decode<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<Transaction> {
        Ok(Transaction {
            version:   u32::decode(rdr, max_length)?,
            txs_in:    Vec::decode(rdr, max_length)?,
            txs_out:   Vec::decode(rdr, max_length)?,
            lock_time: u32::decode(rdr, max_length)?,
        })
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        self.version.encode(buffer);
        self.txs_in.encode(buffer);
        self.txs_out.encode(buffer);
        self.lock_time.encode(buffer);
    }
}

impl Transaction {

    pub fn is_coinbase(&self) -> bool {
        self.txs_in.len() == 1 && self.txs_in[0].prev_tx_out == [0; 32]
    }
}


/// Transaction input
#[derive(Clone, PartialEq, Eq)]
pub struct TxInput {
    pub prev_tx_out:     Hash,
    pub prev_tx_out_idx: u32,
    pub script:          Script,
    pub sequence:        u32,
}

impl NetworkEncoding for TxInput {
    fn decode<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<TxInput> {
        Ok(TxInput {
            prev_tx_out:     Hash::decode(rdr, max_length)?,
            prev_tx_out_idx: u32::decode(rdr, max_length)?,
            script:          Script::decode(rdr, max_length)?,
            sequence:        u32::decode(rdr, max_length)?,
        })
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        self.prev_tx_out.encode(buffer);
        self.prev_tx_out_idx.encode(buffer);
        self.script.encode(buffer);
        self.sequence.encode(buffer);
    }
}

impl fmt::Debug for TxInput {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Prev-TX: {:?}, idx={:?}, {:?}, seq={}",
               HashDisplay(&self.prev_tx_out), self.prev_tx_out_idx, self.script, self.sequence)
    }
}


/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub value:     u64,
    pub pk_script: Script,
}

impl NetworkEncoding for TxOutput {
    fn decode<R: io::Read>(rdr: &mut R, max_length: u64) -> Result<TxOutput> {
        Ok(TxOutput {
            value:     u64::decode(rdr, max_length)?,
            pk_script: Script::decode(rdr, max_length)?,
        })
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        self.value.encode(buffer);
        self.pk_script.encode(buffer);
    }
}
