//! BSQ DAO node — block parsing engine and synchronization state machine.
//!
//! The node derives the BSQ colored-coin ledger from Bitcoin blocks:
//! - Parses each block's transactions and classifies every output
//! - Validates OP_RETURN governance operations against fee and phase rules
//! - Keeps the derived state consistent across full-node and lite-node roles
//! - Detects chain reorganizations and rolls back to the last snapshot
//!
//! Classification is a pure function of (payload, fee, height, phase), so
//! both node roles compute byte-identical results from identical blocks.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod node;
pub mod op_return;
pub mod parser;
pub mod shutdown;
pub mod source;
pub mod sync;
pub mod validators;

pub use config::{NodeConfig, NodeRole};
pub use context::ParsingContext;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::{BsqDaoNode, NodeHandles};
pub use op_return::OpReturnClassifier;
pub use parser::BlockTransactionParser;
pub use shutdown::ShutdownController;
pub use source::{
    BlockSource, LocalBlockSource, LocalChainHandle, PeerBlockSource, PeerSourceHandle,
    SourceError, SourceEvent,
};
pub use sync::{BatchOutcome, BlockOutcome, NewBlockOutcome, NodeSyncController, SyncState};
