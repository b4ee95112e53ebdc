//! Node facade — wires configuration into a running sync controller.
//!
//! The facade owns the pieces whose lifetime spans the whole process: the
//! shutdown controller, the bounded event channel, and the role-specific
//! block source. The embedding network layer talks to the node exclusively
//! through [`NodeHandles`]; everything else stays internal.

use tokio::sync::mpsc;
use tracing::info;

use bsq_state::DaoStateStore;

use crate::config::{NodeConfig, NodeRole};
use crate::error::NodeError;
use crate::shutdown::ShutdownController;
use crate::source::{
    LocalBlockSource, LocalChainHandle, PeerBlockSource, PeerSourceHandle, SourceEvent,
};
use crate::sync::NodeSyncController;

/// Handles through which the surrounding layers feed the node.
pub struct NodeHandles {
    /// Push unsolicited new blocks or block batches.
    pub events: mpsc::Sender<SourceEvent>,
    /// Full role only: publish blocks the local Bitcoin node has validated.
    pub local_chain: Option<LocalChainHandle>,
    /// Lite role only: serve historical block requests with bincode frames.
    pub peer: Option<PeerSourceHandle>,
}

/// The role-specific acquisition capability, selected at construction.
enum RoleSource {
    Local(LocalBlockSource),
    Peer(PeerBlockSource),
}

/// A configured BSQ DAO node, ready to run.
pub struct BsqDaoNode {
    config: NodeConfig,
    shutdown: ShutdownController,
    events_rx: mpsc::Receiver<SourceEvent>,
    source: RoleSource,
}

impl BsqDaoNode {
    /// Build a node and the handles its environment uses to feed it.
    pub fn new(config: NodeConfig) -> (Self, NodeHandles) {
        let (events_tx, events_rx) = mpsc::channel(config.event_queue_capacity);

        let (source, local_chain, peer) = match config.role {
            NodeRole::Full => {
                let (source, handle) = LocalBlockSource::new(config.catch_up_batch_size);
                (RoleSource::Local(source), Some(handle), None)
            }
            NodeRole::Lite => {
                let (source, handle) = PeerBlockSource::new(config.event_queue_capacity);
                (RoleSource::Peer(source), None, Some(handle))
            }
        };

        let node = Self {
            config,
            shutdown: ShutdownController::new(),
            events_rx,
            source,
        };
        let handles = NodeHandles {
            events: events_tx,
            local_chain,
            peer,
        };
        (node, handles)
    }

    /// A clone of the shutdown controller, for signal handling or tests.
    pub fn shutdown_handle(&self) -> ShutdownController {
        self.shutdown.clone()
    }

    /// Run the node until shutdown; returns the final committed state.
    pub async fn start(self) -> Result<DaoStateStore, NodeError> {
        info!(
            network = self.config.network.as_str(),
            role = ?self.config.role,
            "starting BSQ DAO node"
        );

        let controller = NodeSyncController::new(&self.config);
        let controller = match self.source {
            RoleSource::Local(source) => {
                controller.run(source, self.events_rx, &self.shutdown).await?
            }
            RoleSource::Peer(source) => {
                controller.run(source, self.events_rx, &self.shutdown).await?
            }
        };
        Ok(controller.into_store())
    }
}
