//! The phases of a DAO cycle.

use serde::{Deserialize, Serialize};

/// One phase of the recurring DAO cycle.
///
/// Break phases separate the governance actions so that transactions
/// straddling a boundary cannot be valid in two phases at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaoPhase {
    /// Proposals and compensation requests are accepted.
    Proposal,
    BreakA,
    /// Blind votes are accepted.
    BlindVote,
    BreakB,
    /// Vote reveals are accepted.
    VoteReveal,
    BreakC,
    /// Vote results are tallied by downstream consumers.
    Result,
}

impl DaoPhase {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposal => "proposal",
            Self::BreakA => "break_a",
            Self::BlindVote => "blind_vote",
            Self::BreakB => "break_b",
            Self::VoteReveal => "vote_reveal",
            Self::BreakC => "break_c",
            Self::Result => "result",
        }
    }
}
