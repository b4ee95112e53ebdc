//! Chain-state store and snapshots for the BSQ DAO node.
//!
//! The store holds the committed, fully-classified block sequence and is the
//! single source of truth for everything derived from it: fee parameter
//! lookups, idempotence checks, and the data downstream consumers read.
//! Snapshots capture the store at grid heights so a chain reorganization can
//! roll the node back without replaying from genesis.

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::StateError;
pub use snapshot::{SnapshotManager, StateSnapshot};
pub use store::DaoStateStore;
