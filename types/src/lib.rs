//! Fundamental types for the BSQ DAO node.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: block and transaction identifiers, satoshi amounts, output
//! classification tags, and the raw/committed block representations.

pub mod amount;
pub mod block;
pub mod hash;
pub mod network;
pub mod output;

pub use amount::Satoshis;
pub use block::{Block, RawBlock, RawTx, RawTxOutput, Tx, TxOutput};
pub use hash::{BlockHash, TxId};
pub use network::NetworkId;
pub use output::{LockupReason, OpReturnType, TxOutputType};
