//! Per-transaction parsing scratch state.

use bsq_types::OpReturnType;

/// Scratch state accumulated while parsing a single transaction.
///
/// Candidate outputs are tracked by index into the transaction's output list
/// rather than by reference, so the context never aliases the outputs it
/// describes. A context is created when a transaction's parse begins and
/// dropped when it ends; it never crosses transaction boundaries, which
/// bounds the blast radius of any parsing defect to one transaction.
#[derive(Debug, Default)]
pub struct ParsingContext {
    /// Tag read from the last output's payload before validation. Lets the
    /// output walk mark candidate stake/lockup outputs ahead of the final
    /// OP_RETURN check.
    pub op_return_candidate: Option<OpReturnType>,
    /// Set once the OP_RETURN payload has passed its validator.
    pub verified_op_return: Option<OpReturnType>,
    /// Output that becomes BSQ if a compensation request is later accepted
    /// by voting.
    pub issuance_candidate: Option<usize>,
    /// Stake output locked by a blind vote.
    pub blind_vote_lock_stake: Option<usize>,
    /// Stake output unlocked by a vote reveal.
    pub vote_reveal_unlock_stake: Option<usize>,
    /// Output holding BSQ locked up in a bond.
    pub lockup_candidate: Option<usize>,
    /// Lock duration decoded from a valid lockup payload, staged here until
    /// the transaction is finalized.
    pub lock_time: Option<u16>,
}

impl ParsingContext {
    pub fn new() -> Self {
        Self::default()
    }
}
