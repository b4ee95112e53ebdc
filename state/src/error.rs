use thiserror::Error;

use bsq_types::BlockHash;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(
        "block at height {height} does not connect: expected previous {expected}, got {got}"
    )]
    BlockNotConnecting {
        height: u32,
        expected: BlockHash,
        got: BlockHash,
    },

    #[error("non-contiguous block height: expected {expected}, got {got}")]
    NonContiguousHeight { expected: u32, got: u32 },

    #[error("no snapshot available at or below height {0}")]
    SnapshotMissing(u32),

    #[error("snapshot at height {0} failed its integrity check")]
    SnapshotCorrupt(u32),

    #[error("serialization error: {0}")]
    Serialization(String),
}
