//! State snapshots — capture the committed chain at grid heights.
//!
//! Snapshots exist for exactly one purpose: reorg recovery. When an incoming
//! block does not connect to the tip, the sync controller restores the newest
//! snapshot at or below the mismatch point and re-syncs from there. The
//! snapshot hash is computed deterministically from the block sequence so a
//! corrupted snapshot is detected before it can poison the restored state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bsq_types::{Block, NetworkId};

use crate::error::StateError;
use crate::store::DaoStateStore;

/// Upper bound on retained snapshots; the oldest is dropped beyond this.
const MAX_RETAINED_SNAPSHOTS: usize = 24;

/// A snapshot of the committed chain state at a specific height.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Blake2b-256 of the snapshot content.
    pub hash: [u8; 32],
    /// Chain height this snapshot was taken at.
    pub height: u32,
    /// Network the state belongs to.
    pub network: NetworkId,
    /// Genesis height of the captured store.
    pub genesis_height: u32,
    /// The committed blocks, genesis to tip.
    pub blocks: Vec<Block>,
    /// Snapshot format version.
    pub version: u32,
}

impl StateSnapshot {
    /// Capture the current state of the store.
    ///
    /// Returns `None` while the store is still empty — there is nothing worth
    /// rolling back to before the first committed block.
    pub fn capture(store: &DaoStateStore) -> Option<Self> {
        let height = store.chain_height()?;
        let mut snap = Self {
            hash: [0u8; 32],
            height,
            network: store.network(),
            genesis_height: store.genesis_height(),
            blocks: store.blocks().to_vec(),
            version: 1,
        };
        snap.hash = snap.compute_hash();
        Some(snap)
    }

    /// Compute the Blake2b-256 hash of this snapshot deterministically.
    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        for block in &self.blocks {
            hasher.update(block.height.to_le_bytes());
            hasher.update(block.hash.as_bytes());
            hasher.update(block.previous_hash.as_bytes());
            hasher.update((block.txs.len() as u64).to_le_bytes());
            for tx in &block.txs {
                hasher.update(tx.id.as_bytes());
            }
        }
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.genesis_height.to_le_bytes());

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches the captured data.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("snapshot serialization should not fail")
    }

    /// Deserialize a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        bincode::deserialize(bytes).map_err(|e| StateError::Serialization(e.to_string()))
    }

    /// Rebuild a state store from this snapshot.
    pub fn into_store(self) -> DaoStateStore {
        DaoStateStore::from_parts(self.network, self.genesis_height, self.blocks)
    }
}

/// Keeps snapshots on a height grid and restores them during reorg recovery.
#[derive(Debug)]
pub struct SnapshotManager {
    /// Snapshot every `interval` blocks past genesis.
    interval: u32,
    snapshots: BTreeMap<u32, StateSnapshot>,
}

impl SnapshotManager {
    pub fn new(interval: u32) -> Self {
        assert!(interval > 0, "snapshot interval must be non-zero");
        Self {
            interval,
            snapshots: BTreeMap::new(),
        }
    }

    /// Snapshot the store if its tip sits on the grid.
    ///
    /// Returns the snapshot height when one was taken.
    pub fn maybe_snapshot(&mut self, store: &DaoStateStore) -> Option<u32> {
        let height = store.chain_height()?;
        if (height - store.genesis_height()) % self.interval != 0 {
            return None;
        }
        let snapshot = StateSnapshot::capture(store)?;
        self.snapshots.insert(height, snapshot);
        while self.snapshots.len() > MAX_RETAINED_SNAPSHOTS {
            let oldest = *self.snapshots.keys().next().expect("non-empty");
            self.snapshots.remove(&oldest);
        }
        Some(height)
    }

    /// Restore the newest snapshot at or below `max_height`.
    ///
    /// Snapshots above the restored height are discarded — they were taken
    /// on the branch that is being abandoned. The restored snapshot itself
    /// is consumed as well: re-syncing re-creates grid snapshots on the new
    /// branch, and consuming here guarantees that back-to-back rollbacks
    /// always reach strictly further back instead of looping on one
    /// snapshot.
    pub fn restore(&mut self, max_height: u32) -> Result<DaoStateStore, StateError> {
        let height = *self
            .snapshots
            .range(..=max_height)
            .next_back()
            .map(|(h, _)| h)
            .ok_or(StateError::SnapshotMissing(max_height))?;

        let snapshot = self.snapshots.remove(&height).expect("present");
        if !snapshot.verify() {
            return Err(StateError::SnapshotCorrupt(height));
        }

        self.snapshots.split_off(&(height + 1));

        Ok(snapshot.into_store())
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Heights of all retained snapshots, ascending.
    pub fn heights(&self) -> Vec<u32> {
        self.snapshots.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsq_types::BlockHash;

    fn make_block(height: u32, seed: u8, previous_hash: BlockHash) -> Block {
        Block {
            height,
            hash: BlockHash::new([seed; 32]),
            previous_hash,
            txs: vec![],
        }
    }

    fn store_up_to(height: u32) -> DaoStateStore {
        let mut store = DaoStateStore::with_genesis(NetworkId::Regtest, 100);
        let mut previous = BlockHash::new([0xEE; 32]);
        for h in 100..=height {
            let block = make_block(h, (h % 251) as u8, previous);
            previous = block.hash;
            store.append(block).unwrap();
        }
        store
    }

    #[test]
    fn capture_and_verify() {
        let store = store_up_to(105);
        let snap = StateSnapshot::capture(&store).unwrap();
        assert!(snap.verify());
        assert_eq!(snap.height, 105);
        assert_eq!(snap.blocks.len(), 6);
    }

    #[test]
    fn capture_of_empty_store_yields_none() {
        let store = DaoStateStore::with_genesis(NetworkId::Regtest, 100);
        assert!(StateSnapshot::capture(&store).is_none());
    }

    #[test]
    fn tampered_snapshot_fails_verify() {
        let store = store_up_to(103);
        let mut snap = StateSnapshot::capture(&store).unwrap();
        assert!(snap.verify());

        snap.height = 999;
        assert!(!snap.verify());
    }

    #[test]
    fn serialize_roundtrip() {
        let store = store_up_to(104);
        let snap = StateSnapshot::capture(&store).unwrap();

        let bytes = snap.to_bytes();
        let restored = StateSnapshot::from_bytes(&bytes).unwrap();

        assert_eq!(restored.hash, snap.hash);
        assert_eq!(restored.height, snap.height);
        assert!(restored.verify());
    }

    #[test]
    fn manager_snapshots_on_grid_heights_only() {
        let mut manager = SnapshotManager::new(5);

        // Tip at 103: offset 3 from genesis, off-grid.
        assert_eq!(manager.maybe_snapshot(&store_up_to(103)), None);
        // Tip at 105: offset 5, on-grid.
        assert_eq!(manager.maybe_snapshot(&store_up_to(105)), Some(105));
        assert_eq!(manager.heights(), vec![105]);
    }

    #[test]
    fn restore_picks_newest_at_or_below() {
        let mut manager = SnapshotManager::new(5);
        manager.maybe_snapshot(&store_up_to(100));
        manager.maybe_snapshot(&store_up_to(105));
        manager.maybe_snapshot(&store_up_to(110));

        let restored = manager.restore(108).unwrap();
        assert_eq!(restored.chain_height(), Some(105));

        // The snapshot at 110 was on the abandoned branch; the one at 105
        // was consumed by the restore. Only 100 remains.
        assert_eq!(manager.heights(), vec![100]);
    }

    #[test]
    fn repeated_restores_reach_strictly_further_back() {
        let mut manager = SnapshotManager::new(5);
        manager.maybe_snapshot(&store_up_to(100));
        manager.maybe_snapshot(&store_up_to(105));
        manager.maybe_snapshot(&store_up_to(110));

        assert_eq!(manager.restore(110).unwrap().chain_height(), Some(110));
        assert_eq!(manager.restore(110).unwrap().chain_height(), Some(105));
        assert_eq!(manager.restore(110).unwrap().chain_height(), Some(100));
        assert!(matches!(
            manager.restore(110),
            Err(StateError::SnapshotMissing(110))
        ));
    }

    #[test]
    fn restore_without_snapshot_is_an_error() {
        let mut manager = SnapshotManager::new(5);
        let result = manager.restore(104);
        assert!(matches!(result, Err(StateError::SnapshotMissing(104))));
    }

    #[test]
    fn restored_store_accepts_the_next_block() {
        let mut manager = SnapshotManager::new(5);
        let store = store_up_to(105);
        manager.maybe_snapshot(&store);

        let mut restored = manager.restore(105).unwrap();
        let tip_hash = restored.tip().unwrap().hash;
        restored
            .append(make_block(106, 0x77, tip_hash))
            .expect("restored store must extend cleanly");
    }

    #[test]
    fn retained_set_is_bounded() {
        let mut manager = SnapshotManager::new(1);
        for height in 100..(100 + MAX_RETAINED_SNAPSHOTS as u32 + 10) {
            manager.maybe_snapshot(&store_up_to(height));
        }
        assert_eq!(manager.len(), MAX_RETAINED_SNAPSHOTS);
        // The oldest snapshots were evicted first.
        assert_eq!(manager.heights()[0], 100 + 10);
    }
}
