//! OP_RETURN classification — tag decode, validator dispatch, candidate
//! promotion and demotion.
//!
//! The tag byte arrives as untrusted network input. Known tags dispatch to
//! their validator through an exhaustive match; an unknown tag is a logged
//! protocol deviation that yields `Undefined` without failing the
//! transaction or block, so nodes running this code keep following the chain
//! when future protocol versions introduce new operation types.

use tracing::{info, warn};

use bsq_governance::PeriodService;
use bsq_state::DaoStateStore;
use bsq_types::{OpReturnType, Satoshis, TxOutput, TxOutputType};

use crate::context::ParsingContext;
use crate::validators::{self, ValidationServices};

/// Classifies the OP_RETURN output of a transaction and resolves the typing
/// of its correlated candidate outputs.
pub struct OpReturnClassifier<'a> {
    period: &'a PeriodService,
    state: &'a DaoStateStore,
}

impl<'a> OpReturnClassifier<'a> {
    pub fn new(period: &'a PeriodService, state: &'a DaoStateStore) -> Self {
        Self { period, state }
    }

    /// Decode and validate an OP_RETURN payload.
    ///
    /// The position/value gate comes first: a payload on a non-last output,
    /// on an output carrying value, or shorter than one byte is never
    /// validated against type rules — it is classified `Undefined` so a
    /// spoofed mid-transaction payload cannot reach the validators.
    ///
    /// On validator success the matching `*OpReturnOutput` type is returned,
    /// the context's verified type is set, and the correlated candidate
    /// output (if any) is promoted. On validator failure the result is
    /// `InvalidOutput` and the correlated candidate is demoted to
    /// `BtcOutput`, so malformed metadata can never mint BSQ.
    pub fn parse_and_validate(
        &self,
        payload: &[u8],
        value: Satoshis,
        last_output: bool,
        height: u32,
        bsq_fee: Satoshis,
        ctx: &mut ParsingContext,
        outputs: &mut [TxOutput],
    ) -> TxOutputType {
        if !value.is_zero() || !last_output || payload.is_empty() {
            warn!(
                payload = %hex::encode(payload),
                "OP_RETURN data does not match position/value rules"
            );
            return TxOutputType::Undefined;
        }

        let Some(op_return_type) = OpReturnType::from_tag(payload[0]) else {
            warn!(
                tag = payload[0],
                height, "OP_RETURN data does not match any defined type"
            );
            return TxOutputType::Undefined;
        };

        let services = ValidationServices {
            period: self.period,
            state: self.state,
        };

        match op_return_type {
            OpReturnType::Proposal => {
                self.process_proposal(payload, bsq_fee, height, &services, ctx)
            }
            OpReturnType::CompensationRequest => {
                self.process_compensation_request(payload, bsq_fee, height, &services, ctx, outputs)
            }
            OpReturnType::BlindVote => {
                self.process_blind_vote(payload, bsq_fee, height, &services, ctx, outputs)
            }
            OpReturnType::VoteReveal => {
                self.process_vote_reveal(payload, bsq_fee, height, &services, ctx, outputs)
            }
            OpReturnType::Lockup => self.process_lockup(payload, height, ctx, outputs),
        }
    }

    fn process_proposal(
        &self,
        payload: &[u8],
        bsq_fee: Satoshis,
        height: u32,
        services: &ValidationServices<'_>,
        ctx: &mut ParsingContext,
    ) -> TxOutputType {
        if validators::validate_proposal(payload, bsq_fee, height, services) {
            ctx.verified_op_return = Some(OpReturnType::Proposal);
            TxOutputType::ProposalOpReturnOutput
        } else {
            info!(height, "proposal op_return data did not match the rules");
            TxOutputType::InvalidOutput
        }
    }

    fn process_compensation_request(
        &self,
        payload: &[u8],
        bsq_fee: Satoshis,
        height: u32,
        services: &ValidationServices<'_>,
        ctx: &mut ParsingContext,
        outputs: &mut [TxOutput],
    ) -> TxOutputType {
        if validators::validate_compensation_request(payload, bsq_fee, height, services) {
            if let Some(index) = ctx.issuance_candidate {
                outputs[index].output_type = TxOutputType::IssuanceCandidateOutput;
            }
            ctx.verified_op_return = Some(OpReturnType::CompensationRequest);
            TxOutputType::CompReqOpReturnOutput
        } else {
            info!(
                height,
                "compensation request op_return data did not match the rules"
            );
            // An invalid request can never issue BSQ, so the candidate
            // settles as plain BTC.
            if let Some(index) = ctx.issuance_candidate {
                outputs[index].output_type = TxOutputType::BtcOutput;
            }
            TxOutputType::InvalidOutput
        }
    }

    fn process_blind_vote(
        &self,
        payload: &[u8],
        bsq_fee: Satoshis,
        height: u32,
        services: &ValidationServices<'_>,
        ctx: &mut ParsingContext,
        outputs: &mut [TxOutput],
    ) -> TxOutputType {
        if validators::validate_blind_vote(payload, bsq_fee, height, services) {
            if let Some(index) = ctx.blind_vote_lock_stake {
                outputs[index].output_type = TxOutputType::BlindVoteLockStakeOutput;
            }
            ctx.verified_op_return = Some(OpReturnType::BlindVote);
            TxOutputType::BlindVoteOpReturnOutput
        } else {
            info!(height, "blind vote op_return data did not match the rules");
            if let Some(index) = ctx.blind_vote_lock_stake {
                outputs[index].output_type = TxOutputType::BtcOutput;
            }
            TxOutputType::InvalidOutput
        }
    }

    fn process_vote_reveal(
        &self,
        payload: &[u8],
        bsq_fee: Satoshis,
        height: u32,
        services: &ValidationServices<'_>,
        ctx: &mut ParsingContext,
        outputs: &mut [TxOutput],
    ) -> TxOutputType {
        if validators::validate_vote_reveal(payload, bsq_fee, height, services) {
            if let Some(index) = ctx.vote_reveal_unlock_stake {
                outputs[index].output_type = TxOutputType::VoteRevealUnlockStakeOutput;
            }
            ctx.verified_op_return = Some(OpReturnType::VoteReveal);
            TxOutputType::VoteRevealOpReturnOutput
        } else {
            info!(height, "vote reveal op_return data did not match the rules");
            if let Some(index) = ctx.vote_reveal_unlock_stake {
                outputs[index].output_type = TxOutputType::BtcOutput;
            }
            TxOutputType::InvalidOutput
        }
    }

    fn process_lockup(
        &self,
        payload: &[u8],
        height: u32,
        ctx: &mut ParsingContext,
        outputs: &mut [TxOutput],
    ) -> TxOutputType {
        match validators::validate_lockup(payload) {
            Some(lockup) => {
                if let Some(index) = ctx.lockup_candidate {
                    outputs[index].output_type = TxOutputType::LockupOutput;
                }
                ctx.verified_op_return = Some(OpReturnType::Lockup);
                ctx.lock_time = Some(lockup.lock_time);
                TxOutputType::LockupOpReturnOutput
            }
            None => {
                info!(height, "lockup op_return data did not match the rules");
                if let Some(index) = ctx.lockup_candidate {
                    outputs[index].output_type = TxOutputType::BtcOutput;
                }
                TxOutputType::InvalidOutput
            }
        }
    }
}
