//! Per-type OP_RETURN validators.
//!
//! Each validator is a pure predicate over (payload, fee, height) plus the
//! period and parameter services. They hold no mutable state of their own —
//! full and lite nodes must compute identical verdicts from identical bytes.
//!
//! None of the validators inspect the version byte at payload offset 1: a
//! protocol upgrade bumps the version without invalidating operations from
//! nodes that have not upgraded yet, so compatibility has to be handled
//! forward, not rejected here.

use bsq_governance::{DaoPhase, Param, PeriodService};
use bsq_state::DaoStateStore;
use bsq_types::{LockupReason, Satoshis};

/// Proposal payload: tag, version, 20-byte payload hash.
pub const PROPOSAL_PAYLOAD_LEN: usize = 22;
/// Compensation request payload: tag, version, 20-byte payload hash.
pub const COMP_REQUEST_PAYLOAD_LEN: usize = 22;
/// Blind vote payload: tag, version, 20-byte encrypted-ballot hash.
pub const BLIND_VOTE_PAYLOAD_LEN: usize = 22;
/// Vote reveal payload: tag, version, 20-byte vote-list hash, 16-byte key.
pub const VOTE_REVEAL_PAYLOAD_LEN: usize = 38;
/// Lockup payload: tag, version, reason byte, 2-byte big-endian lock time.
pub const LOCKUP_PAYLOAD_LEN: usize = 5;

const LOCKUP_REASON_OFFSET: usize = 2;
const LOCKUP_LOCK_TIME_OFFSET: usize = 3;

/// Read-only services every validator consults.
pub struct ValidationServices<'a> {
    pub period: &'a PeriodService,
    pub state: &'a DaoStateStore,
}

/// Whether the payload is a valid proposal operation.
pub fn validate_proposal(
    payload: &[u8],
    bsq_fee: Satoshis,
    height: u32,
    services: &ValidationServices<'_>,
) -> bool {
    payload.len() == PROPOSAL_PAYLOAD_LEN
        && bsq_fee == services.state.param_value(Param::ProposalFee, height)
        && services.period.is_in_phase(height, DaoPhase::Proposal)
}

/// Whether the payload is a valid compensation request operation.
pub fn validate_compensation_request(
    payload: &[u8],
    bsq_fee: Satoshis,
    height: u32,
    services: &ValidationServices<'_>,
) -> bool {
    payload.len() == COMP_REQUEST_PAYLOAD_LEN
        && bsq_fee
            == services
                .state
                .param_value(Param::CompensationRequestFee, height)
        && services.period.is_in_phase(height, DaoPhase::Proposal)
}

/// Whether the payload is a valid blind vote operation.
pub fn validate_blind_vote(
    payload: &[u8],
    bsq_fee: Satoshis,
    height: u32,
    services: &ValidationServices<'_>,
) -> bool {
    payload.len() == BLIND_VOTE_PAYLOAD_LEN
        && bsq_fee == services.state.param_value(Param::BlindVoteFee, height)
        && services.period.is_in_phase(height, DaoPhase::BlindVote)
}

/// Whether the payload is a valid vote reveal operation.
///
/// Revealing charges no fee — the stake flows back to the voter, so any
/// burned BSQ means the transaction is malformed.
pub fn validate_vote_reveal(
    payload: &[u8],
    bsq_fee: Satoshis,
    height: u32,
    services: &ValidationServices<'_>,
) -> bool {
    payload.len() == VOTE_REVEAL_PAYLOAD_LEN
        && bsq_fee.is_zero()
        && services.period.is_in_phase(height, DaoPhase::VoteReveal)
}

/// Data decoded from a valid lockup payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockupData {
    pub reason: LockupReason,
    /// Lock duration in blocks.
    pub lock_time: u16,
}

/// Decode and validate a lockup payload.
///
/// Lockups are not bound to a cycle phase; bonds can be posted at any
/// height. Returns `None` for a wrong length, an undefined reason byte, or a
/// zero lock time.
pub fn validate_lockup(payload: &[u8]) -> Option<LockupData> {
    if payload.len() != LOCKUP_PAYLOAD_LEN {
        return None;
    }
    let reason = LockupReason::from_byte(payload[LOCKUP_REASON_OFFSET])?;
    let lock_time = u16::from_be_bytes([
        payload[LOCKUP_LOCK_TIME_OFFSET],
        payload[LOCKUP_LOCK_TIME_OFFSET + 1],
    ]);
    if lock_time == 0 {
        return None;
    }
    Some(LockupData { reason, lock_time })
}
