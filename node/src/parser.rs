//! Block transaction parser.
//!
//! Walks a block's transactions in index order and produces the committed,
//! fully-typed `Block`. Parsing is atomic at block granularity: the raw
//! block is either transformed completely or rejected as a whole, so
//! downstream consumers never observe a partially-typed block.
//!
//! BSQ value tracing across the chain is the chain-state collaborator's job;
//! this parser only consumes each transaction's resolved BSQ input total and
//! allocates it over the outputs to find the burned fee.

use std::collections::HashSet;

use tracing::debug;

use bsq_governance::PeriodService;
use bsq_state::DaoStateStore;
use bsq_types::{Block, OpReturnType, RawBlock, RawTx, Tx, TxOutput, TxOutputType};

use crate::context::ParsingContext;
use crate::error::NodeError;
use crate::op_return::OpReturnClassifier;

/// Parses raw blocks into committed, fully-classified blocks.
pub struct BlockTransactionParser<'a> {
    period: &'a PeriodService,
    state: &'a DaoStateStore,
}

impl<'a> BlockTransactionParser<'a> {
    pub fn new(period: &'a PeriodService, state: &'a DaoStateStore) -> Self {
        Self { period, state }
    }

    /// Parse a raw block into a fully-typed block.
    ///
    /// Structural defects (duplicate transaction ids, output indices out of
    /// position) reject the whole block; nothing of it is committed.
    pub fn parse_block(&self, raw: &RawBlock) -> Result<Block, NodeError> {
        let mut seen_ids = HashSet::new();
        for tx in &raw.txs {
            if !seen_ids.insert(tx.id) {
                return Err(NodeError::InvalidBlock {
                    height: raw.height,
                    reason: format!("duplicate transaction id {}", tx.id),
                });
            }
            for (position, output) in tx.outputs.iter().enumerate() {
                if output.index as usize != position {
                    return Err(NodeError::InvalidBlock {
                        height: raw.height,
                        reason: format!(
                            "output index {} at position {} in tx {}",
                            output.index, position, tx.id
                        ),
                    });
                }
            }
        }

        let txs: Vec<Tx> = raw
            .txs
            .iter()
            .map(|tx| self.parse_tx(tx, raw.height))
            .collect();

        debug!(height = raw.height, tx_count = txs.len(), "parsed block");

        Ok(Block {
            height: raw.height,
            hash: raw.hash,
            previous_hash: raw.previous_hash,
            txs,
        })
    }

    /// Parse a single transaction.
    ///
    /// After this returns, every output carries a final type — `Undefined`
    /// never leaves this function.
    fn parse_tx(&self, raw: &RawTx, height: u32) -> Tx {
        let mut ctx = ParsingContext::new();

        // Peek at the last output before walking: the candidate tag decides
        // which earlier output is a stake/lockup/issuance candidate. Only a
        // partial check is possible here — the fee is not known yet.
        if let Some(last) = raw.last_output() {
            if last.value.is_zero() {
                if let Some(data) = &last.op_return_data {
                    if !data.is_empty() {
                        ctx.op_return_candidate = OpReturnType::from_tag(data[0]);
                    }
                }
            }
        }

        let mut outputs: Vec<TxOutput> = raw
            .outputs
            .iter()
            .map(|o| TxOutput {
                index: o.index,
                value: o.value,
                op_return_data: o.op_return_data.clone(),
                output_type: TxOutputType::Undefined,
            })
            .collect();

        // Allocate the BSQ carried by the inputs over the outputs in index
        // order. Whatever is left unallocated at the end is the burned fee.
        let mut remaining = raw.bsq_input_value;
        for (index, output) in raw.outputs.iter().enumerate() {
            if output.op_return_data.is_some() || output.value.is_zero() {
                continue;
            }
            if let Some(rest) = remaining.checked_sub(output.value) {
                remaining = rest;
                outputs[index].output_type = TxOutputType::BsqOutput;
                match ctx.op_return_candidate {
                    Some(OpReturnType::BlindVote) if ctx.blind_vote_lock_stake.is_none() => {
                        ctx.blind_vote_lock_stake = Some(index);
                    }
                    Some(OpReturnType::VoteReveal) if ctx.vote_reveal_unlock_stake.is_none() => {
                        ctx.vote_reveal_unlock_stake = Some(index);
                    }
                    Some(OpReturnType::Lockup) if ctx.lockup_candidate.is_none() => {
                        ctx.lockup_candidate = Some(index);
                    }
                    _ => {}
                }
            } else if ctx.op_return_candidate == Some(OpReturnType::CompensationRequest)
                && ctx.issuance_candidate.is_none()
            {
                // The first output not covered by BSQ inputs is the amount
                // the requester wants issued.
                ctx.issuance_candidate = Some(index);
            }
        }
        let bsq_fee = remaining;

        // Classify every payload-bearing output. Only the last output can
        // pass the classifier's position/value gate; earlier ones are shown
        // to it anyway so spoofed payloads are rejected there, not here.
        let classifier = OpReturnClassifier::new(self.period, self.state);
        let last_index = raw.outputs.len().saturating_sub(1);
        for index in 0..outputs.len() {
            let Some(data) = outputs[index].op_return_data.clone() else {
                continue;
            };
            let value = outputs[index].value;
            let output_type = classifier.parse_and_validate(
                &data,
                value,
                index == last_index,
                height,
                bsq_fee,
                &mut ctx,
                &mut outputs,
            );
            outputs[index].output_type = output_type;
        }

        // Everything still undecided is a plain Bitcoin output.
        for output in outputs.iter_mut() {
            if output.output_type == TxOutputType::Undefined {
                output.output_type = TxOutputType::BtcOutput;
            }
        }

        Tx {
            id: raw.id,
            outputs,
            lock_time: ctx.lock_time,
        }
    }
}
