//! Raw (network-supplied) and committed block representations.
//!
//! A `RawBlock` is what the acquisition layer hands to the parser: heights,
//! hashes, transactions and the per-transaction BSQ input total already
//! resolved by the chain-state tracing collaborator. Parsing turns it into a
//! `Block`, whose outputs carry their final `TxOutputType` and which is
//! immutable from the moment it is appended to the state store.

use serde::{Deserialize, Serialize};

use crate::amount::Satoshis;
use crate::hash::{BlockHash, TxId};
use crate::output::TxOutputType;

/// A transaction output as received from the Bitcoin layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTxOutput {
    /// Position of this output inside its transaction.
    pub index: u16,
    /// Output value in satoshis.
    pub value: Satoshis,
    /// Data payload when this output is an OP_RETURN slot.
    pub op_return_data: Option<Vec<u8>>,
}

/// A transaction as received from the Bitcoin layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTx {
    pub id: TxId,
    /// Total BSQ value carried by this transaction's inputs, resolved by the
    /// external chain-state tracing collaborator.
    pub bsq_input_value: Satoshis,
    pub outputs: Vec<RawTxOutput>,
}

/// A block as received from the Bitcoin layer, before classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub height: u32,
    pub hash: BlockHash,
    pub previous_hash: BlockHash,
    pub txs: Vec<RawTx>,
}

/// A fully classified transaction output. Frozen once the owning transaction
/// finishes parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub index: u16,
    pub value: Satoshis,
    pub op_return_data: Option<Vec<u8>>,
    pub output_type: TxOutputType,
}

/// A fully classified transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub id: TxId,
    pub outputs: Vec<TxOutput>,
    /// Lock duration in blocks, set only by a valid lockup operation.
    pub lock_time: Option<u16>,
}

/// A committed block. Immutable once appended to the chain-state store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u32,
    pub hash: BlockHash,
    pub previous_hash: BlockHash,
    pub txs: Vec<Tx>,
}

impl RawTx {
    /// The last output, if any — the only position an OP_RETURN operation is
    /// valid in.
    pub fn last_output(&self) -> Option<&RawTxOutput> {
        self.outputs.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw_block() -> RawBlock {
        RawBlock {
            height: 100,
            hash: BlockHash::new([0xAA; 32]),
            previous_hash: BlockHash::new([0xBB; 32]),
            txs: vec![RawTx {
                id: TxId::new([0x01; 32]),
                bsq_input_value: Satoshis::new(10_000),
                outputs: vec![
                    RawTxOutput {
                        index: 0,
                        value: Satoshis::new(9_800),
                        op_return_data: None,
                    },
                    RawTxOutput {
                        index: 1,
                        value: Satoshis::ZERO,
                        op_return_data: Some(vec![0x10; 22]),
                    },
                ],
            }],
        }
    }

    #[test]
    fn raw_block_bincode_roundtrip() {
        let block = sample_raw_block();
        let bytes = bincode::serialize(&block).unwrap();
        let decoded: RawBlock = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn last_output_is_the_op_return_slot() {
        let block = sample_raw_block();
        let last = block.txs[0].last_output().unwrap();
        assert_eq!(last.index, 1);
        assert!(last.op_return_data.is_some());
    }
}
