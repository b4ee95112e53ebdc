//! Node synchronization state machine.
//!
//! One controller serves both node roles. It starts in `CatchingUp`,
//! requesting historical blocks in strictly increasing height order, goes
//! `Live` once its source reports the chain tip, and drops into
//! `RollingBack` when an incoming block's previous-hash does not match the
//! committed tip — restoring the latest snapshot and resuming catch-up from
//! there. Role differences are confined entirely to the [`BlockSource`]
//! implementation handed to [`NodeSyncController::run`].
//!
//! Block application is strictly sequential: one block at a time flows
//! through parse → append → snapshot on the run loop's task, and a block
//! that is mid-commit is never interrupted, not even by shutdown.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use bsq_governance::PeriodService;
use bsq_state::{DaoStateStore, SnapshotManager, StateError};
use bsq_types::RawBlock;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::parser::BlockTransactionParser;
use crate::shutdown::ShutdownController;
use crate::source::{BlockSource, SourceEvent};

/// Lifecycle state of the sync controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Requesting historical blocks up to the source's chain tip.
    CatchingUp,
    /// Processing new blocks as they are broadcast.
    Live,
    /// Restoring a snapshot after a detected reorganization.
    RollingBack,
}

/// Result of processing a single block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Parsed and appended to the chain state.
    Committed(u32),
    /// Already committed with the same (height, hash) — nothing to do.
    Skipped(u32),
}

/// Result of processing a catch-up batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The whole batch was attempted.
    Completed { committed: usize, skipped: usize },
    /// A block did not connect; a snapshot was restored and catch-up must
    /// resume from `resume_height`.
    ReorgDetected { resume_height: u32 },
}

/// Result of processing an unsolicited new block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewBlockOutcome {
    Committed(u32),
    /// Known, invalid, or stale — dropped without touching state.
    Ignored,
    /// The controller fell back to catch-up (height gap or reorg).
    CatchUpRequired { resume_height: u32 },
}

/// Lifecycle state machine shared by the full and lite node roles.
pub struct NodeSyncController {
    state: SyncState,
    store: DaoStateStore,
    snapshots: SnapshotManager,
    period: PeriodService,
    catch_up_batch_size: usize,
    source_retry: Duration,
}

impl NodeSyncController {
    /// Controller with an empty state store, configured per `config`.
    pub fn new(config: &NodeConfig) -> Self {
        Self::with_parts(
            DaoStateStore::new(config.network),
            SnapshotManager::new(config.snapshot_interval),
            PeriodService::for_network(config.network),
            config.catch_up_batch_size,
            Duration::from_secs(config.source_retry_secs),
        )
    }

    /// Controller over explicit collaborators (tests, replays).
    pub fn with_parts(
        store: DaoStateStore,
        snapshots: SnapshotManager,
        period: PeriodService,
        catch_up_batch_size: usize,
        source_retry: Duration,
    ) -> Self {
        Self {
            state: SyncState::CatchingUp,
            store,
            snapshots,
            period,
            catch_up_batch_size,
            source_retry,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn store(&self) -> &DaoStateStore {
        &self.store
    }

    /// Hand back the committed state, consuming the controller.
    pub fn into_store(self) -> DaoStateStore {
        self.store
    }

    /// Begin historical catch-up.
    ///
    /// Returns the height the first request must start from. Requesting at
    /// or below the committed tip is harmless (known blocks are skipped
    /// idempotently), but requesting above it would open a gap, so the
    /// height is clamped to the next uncommitted one.
    pub fn start_sync(&mut self, from_height: u32) -> u32 {
        self.state = SyncState::CatchingUp;
        let effective = from_height.min(self.store.next_height());
        info!(from_height = effective, "starting historical catch-up");
        effective
    }

    /// Process a catch-up batch in order.
    ///
    /// Known blocks are skipped, invalid blocks are skipped with a warning
    /// and later blocks are still attempted. A non-connecting block triggers
    /// rollback and ends the batch. Only an unrecoverable rollback (no
    /// snapshot left) escalates as an error.
    pub fn on_blocks_received(&mut self, batch: Vec<RawBlock>) -> Result<BatchOutcome, NodeError> {
        if let (Some(first), Some(last)) = (batch.first(), batch.last()) {
            debug!(
                count = batch.len(),
                first_height = first.height,
                last_height = last.height,
                "received block batch"
            );
        }

        let mut committed = 0;
        let mut skipped = 0;
        for raw in &batch {
            match self.process_raw_block(raw) {
                Ok(BlockOutcome::Committed(_)) => committed += 1,
                Ok(BlockOutcome::Skipped(_)) => skipped += 1,
                Err(NodeError::State(StateError::BlockNotConnecting { height, .. })) => {
                    warn!(height, "block does not connect to the committed tip");
                    let resume_height = self.roll_back()?;
                    return Ok(BatchOutcome::ReorgDetected { resume_height });
                }
                Err(NodeError::State(StateError::NonContiguousHeight { expected, got })) => {
                    warn!(expected, got, "skipping out-of-order block");
                    skipped += 1;
                }
                Err(NodeError::InvalidBlock { height, reason }) => {
                    warn!(height, %reason, "skipping invalid block");
                    skipped += 1;
                }
                Err(other) => return Err(other),
            }
        }
        Ok(BatchOutcome::Completed { committed, skipped })
    }

    /// Process an unsolicited, freshly broadcast block.
    pub fn on_new_block_received(&mut self, raw: &RawBlock) -> Result<NewBlockOutcome, NodeError> {
        match self.process_raw_block(raw) {
            Ok(BlockOutcome::Committed(height)) => Ok(NewBlockOutcome::Committed(height)),
            Ok(BlockOutcome::Skipped(height)) => {
                debug!(height, "ignoring already known block");
                Ok(NewBlockOutcome::Ignored)
            }
            Err(NodeError::State(StateError::BlockNotConnecting { height, .. })) => {
                warn!(height, "new block does not connect to the committed tip");
                let resume_height = self.roll_back()?;
                Ok(NewBlockOutcome::CatchUpRequired { resume_height })
            }
            Err(NodeError::State(StateError::NonContiguousHeight { expected, got })) => {
                if got > expected {
                    // We are behind the network; fetch the gap.
                    warn!(expected, got, "new block is ahead of us — resuming catch-up");
                    self.state = SyncState::CatchingUp;
                    Ok(NewBlockOutcome::CatchUpRequired {
                        resume_height: expected,
                    })
                } else {
                    // A stale block below our tip with an unknown hash. If
                    // it starts a competing branch, that branch's successor
                    // will fail to connect and take the reorg path.
                    debug!(expected, got, "ignoring stale block below the tip");
                    Ok(NewBlockOutcome::Ignored)
                }
            }
            Err(NodeError::InvalidBlock { height, reason }) => {
                warn!(height, %reason, "ignoring invalid new block");
                Ok(NewBlockOutcome::Ignored)
            }
            Err(other) => Err(other),
        }
    }

    /// Parse and commit one block; idempotent for already-committed blocks.
    fn process_raw_block(&mut self, raw: &RawBlock) -> Result<BlockOutcome, NodeError> {
        if self.store.contains_block(raw.height, &raw.hash) {
            return Ok(BlockOutcome::Skipped(raw.height));
        }

        let block = {
            let parser = BlockTransactionParser::new(&self.period, &self.store);
            parser.parse_block(raw)?
        };
        self.store.append(block)?;
        if let Some(height) = self.snapshots.maybe_snapshot(&self.store) {
            debug!(height, "took state snapshot");
        }
        info!(height = raw.height, "committed block");
        Ok(BlockOutcome::Committed(raw.height))
    }

    /// Restore the latest snapshot at or below the committed tip.
    ///
    /// Discards every block derived from the orphaned branch — derived state
    /// is never partially retained. Returns the height catch-up resumes
    /// from. A missing snapshot is unrecoverable and surfaces to the
    /// operator.
    fn roll_back(&mut self) -> Result<u32, NodeError> {
        self.state = SyncState::RollingBack;
        let tip = self
            .store
            .chain_height()
            .unwrap_or_else(|| self.store.genesis_height());
        let restored = self.snapshots.restore(tip)?;
        warn!(
            orphaned_tip = tip,
            restored_tip = ?restored.chain_height(),
            "restored state from snapshot after reorg"
        );
        self.store = restored;
        self.state = SyncState::CatchingUp;
        Ok(self.store.next_height())
    }

    /// Drive the controller until shutdown.
    ///
    /// Catch-up pulls batches from `source`; live mode consumes unsolicited
    /// events from the bounded channel. Source failures are transient and
    /// retried after the configured delay. The controller is returned so the
    /// caller can inspect or persist the final state.
    pub async fn run<S: BlockSource + Send>(
        mut self,
        mut source: S,
        mut events: mpsc::Receiver<SourceEvent>,
        shutdown: &ShutdownController,
    ) -> Result<Self, NodeError> {
        let mut shutdown_rx = shutdown.subscribe();
        let mut resume = self.start_sync(self.store.next_height());

        'run: loop {
            while self.state == SyncState::CatchingUp {
                let request = tokio::select! {
                    result = source.request_blocks(resume) => result,
                    _ = shutdown_rx.recv() => break 'run,
                };
                match request {
                    Err(error) => {
                        warn!(%error, "block source unavailable — retrying");
                        tokio::select! {
                            _ = tokio::time::sleep(self.source_retry) => {}
                            _ = shutdown_rx.recv() => break 'run,
                        }
                    }
                    Ok(batch) => {
                        let batch_len = batch.len();
                        match self.on_blocks_received(batch)? {
                            BatchOutcome::ReorgDetected { resume_height } => {
                                resume = resume_height;
                            }
                            BatchOutcome::Completed { .. } => {
                                if batch_len < self.catch_up_batch_size {
                                    info!(
                                        tip = ?self.store.chain_height(),
                                        "caught up with the chain tip"
                                    );
                                    self.state = SyncState::Live;
                                } else {
                                    resume = self.store.next_height();
                                }
                            }
                        }
                    }
                }
            }

            while self.state == SyncState::Live {
                tokio::select! {
                    event = events.recv() => match event {
                        None => break 'run,
                        Some(SourceEvent::NewBlock(block)) => {
                            if let NewBlockOutcome::CatchUpRequired { resume_height } =
                                self.on_new_block_received(&block)?
                            {
                                resume = resume_height;
                            }
                        }
                        Some(SourceEvent::Blocks(batch)) => {
                            if let BatchOutcome::ReorgDetected { resume_height } =
                                self.on_blocks_received(batch)?
                            {
                                resume = resume_height;
                            }
                        }
                    },
                    _ = shutdown_rx.recv() => break 'run,
                }
            }
        }

        info!(tip = ?self.store.chain_height(), "sync controller stopped");
        Ok(self)
    }
}
