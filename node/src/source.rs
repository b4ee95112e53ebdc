//! Block acquisition — the only part of the node that differs between the
//! full and lite roles.
//!
//! A [`BlockSource`] answers historical catch-up requests; unsolicited new
//! blocks are pushed to the sync controller through a bounded
//! [`SourceEvent`] channel. The controller itself is role-agnostic: reorg
//! and lifecycle logic live there exactly once.

use std::future::Future;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use bsq_types::RawBlock;

#[derive(Debug, Error)]
pub enum SourceError {
    /// No peer or local provider can serve blocks right now. Transient;
    /// the controller retries after a delay.
    #[error("no block source available")]
    NoSourceAvailable,

    /// The source's channel closed mid-request. Also retried; a replacement
    /// source may be attached later.
    #[error("block source disconnected")]
    Disconnected,
}

/// Events pushed from the acquisition side to the sync controller.
#[derive(Debug)]
pub enum SourceEvent {
    /// An unsolicited freshly-broadcast block.
    NewBlock(RawBlock),
    /// A batch of blocks delivered outside a catch-up request.
    Blocks(Vec<RawBlock>),
}

/// Pluggable block acquisition capability.
///
/// Implementations must return blocks in strictly increasing height order,
/// starting at `from_height`, capped at their batch size. A batch shorter
/// than the cap signals that the source has reached its chain tip.
pub trait BlockSource {
    fn request_blocks(
        &mut self,
        from_height: u32,
    ) -> impl Future<Output = Result<Vec<RawBlock>, SourceError>> + Send;
}

// ── Full node: locally validated blocks ────────────────────────────────

/// Handle through which the local block validator publishes blocks it has
/// accepted.
#[derive(Clone)]
pub struct LocalChainHandle {
    chain: Arc<Mutex<Vec<RawBlock>>>,
}

impl LocalChainHandle {
    /// Publish a locally validated block.
    pub fn push(&self, block: RawBlock) {
        let mut chain = self.chain.lock().expect("local chain lock poisoned");
        chain.push(block);
        chain.sort_by_key(|b| b.height);
    }

    pub fn len(&self) -> usize {
        self.chain.lock().expect("local chain lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Block source of the full-node role: serves blocks the local validator
/// has already accepted.
pub struct LocalBlockSource {
    chain: Arc<Mutex<Vec<RawBlock>>>,
    batch_size: usize,
}

impl LocalBlockSource {
    pub fn new(batch_size: usize) -> (Self, LocalChainHandle) {
        let chain = Arc::new(Mutex::new(Vec::new()));
        let handle = LocalChainHandle {
            chain: Arc::clone(&chain),
        };
        (Self { chain, batch_size }, handle)
    }

    /// Source pre-seeded with an already-validated chain (tests, replays).
    pub fn with_chain(batch_size: usize, blocks: Vec<RawBlock>) -> (Self, LocalChainHandle) {
        let (source, handle) = Self::new(batch_size);
        for block in blocks {
            handle.push(block);
        }
        (source, handle)
    }
}

impl BlockSource for LocalBlockSource {
    async fn request_blocks(&mut self, from_height: u32) -> Result<Vec<RawBlock>, SourceError> {
        let chain = self.chain.lock().expect("local chain lock poisoned");
        let batch: Vec<RawBlock> = chain
            .iter()
            .filter(|b| b.height >= from_height)
            .take(self.batch_size)
            .cloned()
            .collect();
        debug!(from_height, count = batch.len(), "served local blocks");
        Ok(batch)
    }
}

// ── Lite node: serialized blocks from a peer ───────────────────────────

/// The peer-facing half of a [`PeerBlockSource`]: the network layer reads
/// requested start heights from `requests` and answers with bincode frames
/// on `responses`.
pub struct PeerSourceHandle {
    pub requests: mpsc::Receiver<u32>,
    pub responses: mpsc::Sender<Vec<Vec<u8>>>,
}

/// Block source of the lite-node role: requests serialized blocks from a
/// peer and decodes them.
pub struct PeerBlockSource {
    requests: mpsc::Sender<u32>,
    responses: mpsc::Receiver<Vec<Vec<u8>>>,
}

impl PeerBlockSource {
    pub fn new(capacity: usize) -> (Self, PeerSourceHandle) {
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (response_tx, response_rx) = mpsc::channel(capacity);
        (
            Self {
                requests: request_tx,
                responses: response_rx,
            },
            PeerSourceHandle {
                requests: request_rx,
                responses: response_tx,
            },
        )
    }

    /// Decode a batch of bincode frames. Frames that fail to decode are
    /// skipped — one mangled frame must not abort the batch.
    fn decode_frames(frames: &[Vec<u8>]) -> Vec<RawBlock> {
        frames
            .iter()
            .filter_map(|bytes| bincode::deserialize::<RawBlock>(bytes).ok())
            .collect()
    }
}

impl BlockSource for PeerBlockSource {
    async fn request_blocks(&mut self, from_height: u32) -> Result<Vec<RawBlock>, SourceError> {
        self.requests
            .send(from_height)
            .await
            .map_err(|_| SourceError::NoSourceAvailable)?;
        let frames = self
            .responses
            .recv()
            .await
            .ok_or(SourceError::Disconnected)?;
        let batch = Self::decode_frames(&frames);
        debug!(from_height, count = batch.len(), "decoded peer blocks");
        Ok(batch)
    }
}
