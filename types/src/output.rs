//! Output classification tags.
//!
//! `TxOutputType` is the closed set of final classifications a transaction
//! output can carry after parsing. `OpReturnType` is different in kind: its
//! tag byte arrives as untrusted network input, so decoding is fallible
//! (`from_tag` returns `Option`) and an unknown byte is a tolerated protocol
//! deviation, never a crash.

use serde::{Deserialize, Serialize};

/// Final classification of a transaction output.
///
/// `Undefined` only exists while a transaction is being parsed; committed
/// outputs always carry one of the other variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxOutputType {
    /// Not yet classified (parse-time only).
    Undefined,
    /// Plain Bitcoin transfer output.
    BtcOutput,
    /// Output whose value is covered by BSQ-colored inputs.
    BsqOutput,
    /// Potential issuance output of a compensation request; becomes BSQ only
    /// once voting accepts the request.
    IssuanceCandidateOutput,
    /// BSQ stake locked by a blind vote transaction.
    BlindVoteLockStakeOutput,
    /// BSQ stake unlocked by a vote reveal transaction.
    VoteRevealUnlockStakeOutput,
    /// BSQ locked up in a bond.
    LockupOutput,
    /// OP_RETURN output of a proposal transaction.
    ProposalOpReturnOutput,
    /// OP_RETURN output of a compensation request transaction.
    CompReqOpReturnOutput,
    /// OP_RETURN output of a blind vote transaction.
    BlindVoteOpReturnOutput,
    /// OP_RETURN output of a vote reveal transaction.
    VoteRevealOpReturnOutput,
    /// OP_RETURN output of a lockup transaction.
    LockupOpReturnOutput,
    /// OP_RETURN output that matched a known tag but failed validation.
    InvalidOutput,
}

/// Operation type embedded in the first byte of an OP_RETURN payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpReturnType {
    Proposal,
    CompensationRequest,
    BlindVote,
    VoteReveal,
    Lockup,
}

impl OpReturnType {
    /// Decode the leading payload byte.
    ///
    /// Unknown bytes return `None` — future protocol versions may define new
    /// tags and older nodes must not choke on them.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x10 => Some(Self::Proposal),
            0x11 => Some(Self::CompensationRequest),
            0x12 => Some(Self::BlindVote),
            0x13 => Some(Self::VoteReveal),
            0x14 => Some(Self::Lockup),
            _ => None,
        }
    }

    /// The wire tag byte for this type.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Proposal => 0x10,
            Self::CompensationRequest => 0x11,
            Self::BlindVote => 0x12,
            Self::VoteReveal => 0x13,
            Self::Lockup => 0x14,
        }
    }

    /// The output type committed when this operation validates successfully.
    pub fn op_return_output_type(&self) -> TxOutputType {
        match self {
            Self::Proposal => TxOutputType::ProposalOpReturnOutput,
            Self::CompensationRequest => TxOutputType::CompReqOpReturnOutput,
            Self::BlindVote => TxOutputType::BlindVoteOpReturnOutput,
            Self::VoteReveal => TxOutputType::VoteRevealOpReturnOutput,
            Self::Lockup => TxOutputType::LockupOpReturnOutput,
        }
    }
}

/// Why BSQ is being locked up. Encoded at payload offset 2 of a lockup
/// OP_RETURN.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockupReason {
    /// Bond backing a DAO role.
    BondedRole,
}

impl LockupReason {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::BondedRole),
            _ => None,
        }
    }

    pub fn byte(&self) -> u8 {
        match self {
            Self::BondedRole => 0x01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip_for_all_known_types() {
        for op in [
            OpReturnType::Proposal,
            OpReturnType::CompensationRequest,
            OpReturnType::BlindVote,
            OpReturnType::VoteReveal,
            OpReturnType::Lockup,
        ] {
            assert_eq!(OpReturnType::from_tag(op.tag()), Some(op));
        }
    }

    #[test]
    fn unknown_tags_decode_to_none() {
        assert_eq!(OpReturnType::from_tag(0x00), None);
        assert_eq!(OpReturnType::from_tag(0x15), None);
        assert_eq!(OpReturnType::from_tag(0xFF), None);
    }

    #[test]
    fn lockup_reason_rejects_out_of_range() {
        assert_eq!(LockupReason::from_byte(0x01), Some(LockupReason::BondedRole));
        assert_eq!(LockupReason::from_byte(0x00), None);
        assert_eq!(LockupReason::from_byte(0x02), None);
    }
}
