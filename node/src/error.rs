use thiserror::Error;

use bsq_state::StateError;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("invalid block at height {height}: {reason}")]
    InvalidBlock { height: u32, reason: String },

    #[error("block source error: {0}")]
    Source(#[from] SourceError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
