//! The committed chain-state store.
//!
//! Blocks are appended strictly in height order and are immutable once in.
//! `append` is the only place the previous-hash link is checked, which makes
//! it the single detection point for chain reorganizations: a mismatch
//! surfaces as [`StateError::BlockNotConnecting`] and the sync controller
//! takes the rollback path.

use serde::{Deserialize, Serialize};

use bsq_governance::Param;
use bsq_types::{Block, BlockHash, NetworkId, Satoshis};

use crate::error::StateError;

/// Height-ordered store of committed, fully-classified blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaoStateStore {
    network: NetworkId,
    genesis_height: u32,
    blocks: Vec<Block>,
}

impl DaoStateStore {
    /// Empty store for the given network, starting at its genesis height.
    pub fn new(network: NetworkId) -> Self {
        Self::with_genesis(network, network.genesis_height())
    }

    /// Empty store with an explicit genesis height (tests, simulations).
    pub fn with_genesis(network: NetworkId, genesis_height: u32) -> Self {
        Self {
            network,
            genesis_height,
            blocks: Vec::new(),
        }
    }

    /// Rebuild a store from snapshot parts.
    pub fn from_parts(network: NetworkId, genesis_height: u32, blocks: Vec<Block>) -> Self {
        Self {
            network,
            genesis_height,
            blocks,
        }
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn genesis_height(&self) -> u32 {
        self.genesis_height
    }

    /// Append the next block.
    ///
    /// Rejects non-contiguous heights and, past genesis, a previous-hash that
    /// does not match the current tip.
    pub fn append(&mut self, block: Block) -> Result<(), StateError> {
        match self.tip() {
            None => {
                if block.height != self.genesis_height {
                    return Err(StateError::NonContiguousHeight {
                        expected: self.genesis_height,
                        got: block.height,
                    });
                }
                // The genesis block's previous hash points into the pre-DAO
                // chain and is not checked.
            }
            Some(tip) => {
                if block.height != tip.height + 1 {
                    return Err(StateError::NonContiguousHeight {
                        expected: tip.height + 1,
                        got: block.height,
                    });
                }
                if block.previous_hash != tip.hash {
                    return Err(StateError::BlockNotConnecting {
                        height: block.height,
                        expected: tip.hash,
                        got: block.previous_hash,
                    });
                }
            }
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Whether a block with this exact (height, hash) pair is committed.
    pub fn contains_block(&self, height: u32, hash: &BlockHash) -> bool {
        self.block_at(height).map(|b| b.hash == *hash).unwrap_or(false)
    }

    /// The committed block at `height`, if any.
    pub fn block_at(&self, height: u32) -> Option<&Block> {
        if height < self.genesis_height {
            return None;
        }
        self.blocks.get((height - self.genesis_height) as usize)
    }

    /// The most recently committed block.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Height of the most recently committed block.
    pub fn chain_height(&self) -> Option<u32> {
        self.tip().map(|b| b.height)
    }

    /// The height the next appended block must have.
    pub fn next_height(&self) -> u32 {
        self.chain_height()
            .map(|h| h + 1)
            .unwrap_or(self.genesis_height)
    }

    /// All committed blocks, in height order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Value of a fee parameter at `height`.
    ///
    /// Currently the per-network default; the height argument is part of the
    /// contract so per-cycle parameter changes can land without touching the
    /// validators.
    pub fn param_value(&self, param: Param, _height: u32) -> Satoshis {
        param.default_value(self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsq_types::{Tx, TxId};

    fn make_block(height: u32, seed: u8, previous_hash: BlockHash) -> Block {
        Block {
            height,
            hash: BlockHash::new([seed; 32]),
            previous_hash,
            txs: vec![Tx {
                id: TxId::new([seed; 32]),
                outputs: vec![],
                lock_time: None,
            }],
        }
    }

    fn store_with_two_blocks() -> DaoStateStore {
        let mut store = DaoStateStore::with_genesis(NetworkId::Regtest, 100);
        let genesis = make_block(100, 1, BlockHash::new([0xEE; 32]));
        let second = make_block(101, 2, genesis.hash);
        store.append(genesis).unwrap();
        store.append(second).unwrap();
        store
    }

    #[test]
    fn append_builds_a_connected_chain() {
        let store = store_with_two_blocks();
        assert_eq!(store.chain_height(), Some(101));
        assert_eq!(store.block_count(), 2);
        assert_eq!(store.next_height(), 102);
    }

    #[test]
    fn first_block_must_be_at_genesis_height() {
        let mut store = DaoStateStore::with_genesis(NetworkId::Regtest, 100);
        let result = store.append(make_block(101, 1, BlockHash::ZERO));
        assert!(matches!(
            result,
            Err(StateError::NonContiguousHeight {
                expected: 100,
                got: 101
            })
        ));
    }

    #[test]
    fn append_rejects_height_gap() {
        let mut store = store_with_two_blocks();
        let tip_hash = store.tip().unwrap().hash;
        let result = store.append(make_block(103, 3, tip_hash));
        assert!(matches!(
            result,
            Err(StateError::NonContiguousHeight {
                expected: 102,
                got: 103
            })
        ));
    }

    #[test]
    fn append_rejects_non_connecting_previous_hash() {
        let mut store = store_with_two_blocks();
        let result = store.append(make_block(102, 3, BlockHash::new([0x99; 32])));
        assert!(matches!(
            result,
            Err(StateError::BlockNotConnecting { height: 102, .. })
        ));
        // Nothing was committed.
        assert_eq!(store.chain_height(), Some(101));
    }

    #[test]
    fn contains_block_matches_height_and_hash() {
        let store = store_with_two_blocks();
        assert!(store.contains_block(100, &BlockHash::new([1; 32])));
        assert!(store.contains_block(101, &BlockHash::new([2; 32])));
        // Right height, wrong hash.
        assert!(!store.contains_block(101, &BlockHash::new([9; 32])));
        // Unknown height.
        assert!(!store.contains_block(102, &BlockHash::new([2; 32])));
    }

    #[test]
    fn block_at_ignores_pre_genesis_heights() {
        let store = store_with_two_blocks();
        assert!(store.block_at(99).is_none());
        assert_eq!(store.block_at(100).unwrap().height, 100);
    }

    #[test]
    fn param_value_returns_network_default() {
        let store = DaoStateStore::new(NetworkId::Mainnet);
        assert_eq!(
            store.param_value(Param::ProposalFee, 600_000),
            Param::ProposalFee.default_value(NetworkId::Mainnet)
        );
    }
}
