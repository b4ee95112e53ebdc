//! Consensus fee parameters.
//!
//! Fees are charged in BSQ satoshis and checked byte-for-byte against the
//! burned amount of each operation — a mismatch invalidates the operation.

use serde::{Deserialize, Serialize};

use bsq_types::{NetworkId, Satoshis};

/// Fee parameters consulted during OP_RETURN validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    /// Fee burned by a governance proposal.
    ProposalFee,
    /// Fee burned by a compensation request.
    CompensationRequestFee,
    /// Fee burned by a blind vote.
    BlindVoteFee,
}

impl Param {
    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProposalFee => "proposal_fee",
            Self::CompensationRequestFee => "compensation_request_fee",
            Self::BlindVoteFee => "blind_vote_fee",
        }
    }

    /// Default value of this parameter on the given network.
    pub fn default_value(&self, _network: NetworkId) -> Satoshis {
        // Same on every network for now; the NetworkId parameter stays so a
        // testnet fee experiment does not ripple through call sites.
        match self {
            Self::ProposalFee => Satoshis::new(200),
            Self::CompensationRequestFee => Satoshis::new(200),
            Self::BlindVoteFee => Satoshis::new(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(Param::ProposalFee.name(), "proposal_fee");
        assert_eq!(
            Param::CompensationRequestFee.name(),
            "compensation_request_fee"
        );
        assert_eq!(Param::BlindVoteFee.name(), "blind_vote_fee");
    }

    #[test]
    fn defaults_are_non_zero() {
        for param in [
            Param::ProposalFee,
            Param::CompensationRequestFee,
            Param::BlindVoteFee,
        ] {
            assert!(!param.default_value(NetworkId::Mainnet).is_zero());
        }
    }
}
