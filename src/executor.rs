//! Transaction Executor
//!
//! The only component that commits irreversible actions. When the decision
//! is profitable it optionally raises the token allowance (confirming the
//! approval before anything else), populates the target call from the
//! candidate parameters, submits through the relay, and waits for
//! confirmation. Every step is independently fallible and captured at
//! opportunity granularity.
//!
//! Author: AI-Generated
//! Created: 2026-07-24
//! Modified: 2026-08-01 - private-flag capability gating moved into constructor

use crate::config::AddressBook;
use crate::contracts::{IClaimer, IDrawAuction, IERC20, ILiquidationRouter, IRngAuction};
use crate::relay::{supports_private_tx, Relay, RelayRequest};
use crate::types::{AuctionStage, CandidateParameters, ExecutionOutcome};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Approve-once policy: the maximum representable signed integer amount
/// (2^255 - 1), so routers that store allowances as int256 accept it.
pub const MAX_APPROVAL: U256 =
    U256::from_limbs([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 1]);

/// Fixed gas limit for ERC-20 approvals.
const APPROVE_GAS_LIMIT: u64 = 80_000;

/// Current allowance state for the input token of a candidate action.
#[derive(Debug, Clone, Copy)]
pub struct AllowanceState {
    pub token: Address,
    pub spender: Address,
    pub current: U256,
    pub required: U256,
}

pub struct TransactionExecutor<R> {
    relay: R,
    book: AddressBook,
    /// Effective privacy flag: operator opt-in AND chain capability.
    private: bool,
}

impl<R: Relay> TransactionExecutor<R> {
    pub fn new(relay: R, book: AddressBook, use_private_tx: bool, chain_id: u64) -> Self {
        let private = use_private_tx && supports_private_tx(chain_id);
        if use_private_tx && !private {
            warn!(
                "Private submission requested but chain {} does not support it; submitting publicly",
                chain_id
            );
        }
        Self {
            relay,
            book,
            private,
        }
    }

    /// Submit the candidate action. Failures are recorded in the outcome,
    /// never propagated: one opportunity's failure must not abort the rest
    /// of the cycle.
    pub async fn execute(
        &self,
        params: &CandidateParameters,
        allowance: Option<&AllowanceState>,
        gas_units: u64,
    ) -> ExecutionOutcome {
        if let Some(state) = allowance {
            if state.current < state.required {
                if let Err(e) = self.raise_allowance(state).await {
                    return ExecutionOutcome::failed(format!("Approval failed: {:#}", e));
                }
            }
        }

        let (to, data) = candidate_call(params, &self.book);
        let request = RelayRequest {
            to,
            data,
            gas_limit: with_headroom(gas_units),
            private: self.private,
        };

        let hash = match self.relay.submit(request).await {
            Ok(hash) => hash,
            Err(e) => return ExecutionOutcome::failed(format!("Submission failed: {:#}", e)),
        };

        match self.relay.wait_for_confirmation(hash).await {
            Ok(final_hash) => ExecutionOutcome::confirmed(final_hash),
            Err(e) => ExecutionOutcome {
                success: false,
                transaction_hash: Some(hash),
                error_reason: Some(format!("Confirmation failed: {:#}", e)),
            },
        }
    }

    /// Approve the spender for the maximum amount and wait until the
    /// approval is mined; the main call is not safe to submit before then.
    async fn raise_allowance(&self, state: &AllowanceState) -> Result<()> {
        info!(
            "Raising allowance for {:?} on {:?} ({} < {})",
            state.spender, state.token, state.current, state.required
        );

        let data = IERC20::approveCall {
            spender: state.spender,
            amount: MAX_APPROVAL,
        }
        .abi_encode();

        let hash = self
            .relay
            .submit(RelayRequest {
                to: state.token,
                data: data.into(),
                gas_limit: APPROVE_GAS_LIMIT,
                // Approvals carry no front-running value
                private: false,
            })
            .await
            .context("Approval submission")?;

        self.relay
            .wait_for_confirmation(hash)
            .await
            .context("Approval confirmation")?;
        Ok(())
    }
}

/// Populate destination and calldata for a candidate action. Shared with
/// the gas estimator so the simulated call is byte-identical to the
/// submitted one.
pub fn candidate_call(params: &CandidateParameters, book: &AddressBook) -> (Address, Bytes) {
    match params {
        CandidateParameters::Swap(p) => (
            book.liquidation_router,
            ILiquidationRouter::swapExactAmountOutCall {
                pair: p.pair,
                receiver: p.receiver,
                amountOut: p.amount_out,
                amountInMax: p.amount_in_max,
            }
            .abi_encode()
            .into(),
        ),
        CandidateParameters::Claim(p) => (
            book.claimer,
            IClaimer::claimPrizesCall {
                drawId: p.draw_id,
                claims: p
                    .claims
                    .iter()
                    .map(|c| IClaimer::Claim {
                        vault: c.vault,
                        winner: c.winner,
                        tier: c.tier,
                        prizeIndex: c.prize_index,
                    })
                    .collect(),
                feeRecipient: p.fee_recipient,
                minFeePerClaim: p.min_fee_per_claim,
            }
            .abi_encode()
            .into(),
        ),
        CandidateParameters::Auction(p) => match p.stage {
            AuctionStage::Rng => (
                book.rng_auction,
                IRngAuction::startRngRequestCall {
                    rewardRecipient: p.reward_recipient,
                }
                .abi_encode()
                .into(),
            ),
            AuctionStage::Draw => (
                book.draw_auction,
                IDrawAuction::completeDrawCall {
                    rewardRecipient: p.reward_recipient,
                }
                .abi_encode()
                .into(),
            ),
        },
    }
}

/// Submitted gas limit: simulated units with 50% headroom.
pub fn with_headroom(gas_units: u64) -> u64 {
    gas_units + gas_units / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SwapParams, PrizeClaim, ClaimParams, AuctionParams};
    use alloy::primitives::TxHash;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn book() -> AddressBook {
        AddressBook {
            market_rate_feed: Address::repeat_byte(0x01),
            wrapped_native: Address::repeat_byte(0x02),
            liquidation_router: Address::repeat_byte(0x03),
            prize_pool: Address::repeat_byte(0x04),
            claimer: Address::repeat_byte(0x05),
            rng_auction: Address::repeat_byte(0x06),
            draw_auction: Address::repeat_byte(0x07),
        }
    }

    struct MockRelay {
        submitted: Mutex<Vec<RelayRequest>>,
        fail_submit: bool,
    }

    impl MockRelay {
        fn new() -> Self {
            Self {
                submitted: Mutex::new(Vec::new()),
                fail_submit: false,
            }
        }

        fn failing() -> Self {
            Self {
                submitted: Mutex::new(Vec::new()),
                fail_submit: true,
            }
        }
    }

    #[async_trait]
    impl Relay for MockRelay {
        async fn submit(&self, request: RelayRequest) -> Result<TxHash> {
            if self.fail_submit {
                anyhow::bail!("relay rejected the submission");
            }
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(request);
            Ok(TxHash::repeat_byte(submitted.len() as u8))
        }

        async fn wait_for_confirmation(&self, hash: TxHash) -> Result<TxHash> {
            Ok(hash)
        }
    }

    fn swap_params() -> CandidateParameters {
        CandidateParameters::Swap(SwapParams {
            pair: Address::repeat_byte(0x10),
            receiver: Address::repeat_byte(0x11),
            amount_out: U256::from(500u64),
            amount_in: U256::from(80u64),
            amount_in_max: U256::from(80u64),
        })
    }

    #[tokio::test]
    async fn test_swap_submission_carries_the_candidate_amounts() {
        let executor = TransactionExecutor::new(MockRelay::new(), book(), false, 10);
        let outcome = executor.execute(&swap_params(), None, 200_000).await;

        assert!(outcome.success);
        assert!(outcome.transaction_hash.is_some());

        let submitted = executor.relay.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].to, book().liquidation_router);
        assert_eq!(submitted[0].gas_limit, 300_000); // 200k + 50% headroom

        let decoded =
            ILiquidationRouter::swapExactAmountOutCall::abi_decode(&submitted[0].data).unwrap();
        assert_eq!(decoded.amountOut, U256::from(500u64));
        assert_eq!(decoded.amountInMax, U256::from(80u64));
    }

    #[tokio::test]
    async fn test_insufficient_allowance_approves_first() {
        let executor = TransactionExecutor::new(MockRelay::new(), book(), false, 10);
        let allowance = AllowanceState {
            token: Address::repeat_byte(0x20),
            spender: book().liquidation_router,
            current: U256::from(10u64),
            required: U256::from(80u64),
        };
        let outcome = executor.execute(&swap_params(), Some(&allowance), 200_000).await;
        assert!(outcome.success);

        let submitted = executor.relay.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);

        // First submission is the approval, for the max signed amount
        assert_eq!(submitted[0].to, allowance.token);
        let approve = IERC20::approveCall::abi_decode(&submitted[0].data).unwrap();
        assert_eq!(approve.spender, book().liquidation_router);
        assert_eq!(approve.amount, MAX_APPROVAL);

        // Second is the swap itself
        assert_eq!(submitted[1].to, book().liquidation_router);
    }

    #[tokio::test]
    async fn test_sufficient_allowance_skips_approval() {
        let executor = TransactionExecutor::new(MockRelay::new(), book(), false, 10);
        let allowance = AllowanceState {
            token: Address::repeat_byte(0x20),
            spender: book().liquidation_router,
            current: U256::from(1_000u64),
            required: U256::from(80u64),
        };
        executor.execute(&swap_params(), Some(&allowance), 200_000).await;

        let submitted = executor.relay.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].to, book().liquidation_router);
    }

    #[tokio::test]
    async fn test_submission_failure_is_captured_not_raised() {
        let executor = TransactionExecutor::new(MockRelay::failing(), book(), false, 10);
        let outcome = executor.execute(&swap_params(), None, 200_000).await;

        assert!(!outcome.success);
        assert!(outcome.transaction_hash.is_none());
        assert!(outcome.error_reason.unwrap().contains("Submission failed"));
    }

    #[tokio::test]
    async fn test_private_flag_requires_chain_capability() {
        // Mainnet supports private submission
        let executor = TransactionExecutor::new(MockRelay::new(), book(), true, 1);
        executor.execute(&swap_params(), None, 100_000).await;
        assert!(executor.relay.submitted.lock().unwrap()[0].private);

        // Optimism does not, so the flag is dropped
        let executor = TransactionExecutor::new(MockRelay::new(), book(), true, 10);
        executor.execute(&swap_params(), None, 100_000).await;
        assert!(!executor.relay.submitted.lock().unwrap()[0].private);
    }

    #[tokio::test]
    async fn test_claim_call_targets_the_claimer() {
        let executor = TransactionExecutor::new(MockRelay::new(), book(), false, 10);
        let params = CandidateParameters::Claim(ClaimParams {
            draw_id: 12,
            claims: vec![PrizeClaim {
                vault: Address::repeat_byte(0x30),
                winner: Address::repeat_byte(0x31),
                tier: 2,
                prize_index: 5,
            }],
            fee_recipient: Address::repeat_byte(0x32),
            min_fee_per_claim: U256::from(7u64),
        });
        executor.execute(&params, None, 150_000).await;

        let submitted = executor.relay.submitted.lock().unwrap();
        assert_eq!(submitted[0].to, book().claimer);
        let decoded = IClaimer::claimPrizesCall::abi_decode(&submitted[0].data).unwrap();
        assert_eq!(decoded.drawId, 12);
        assert_eq!(decoded.claims.len(), 1);
        assert_eq!(decoded.claims[0].prizeIndex, 5);
        assert_eq!(decoded.minFeePerClaim, U256::from(7u64));
    }

    #[tokio::test]
    async fn test_auction_stage_selects_the_target_contract() {
        let executor = TransactionExecutor::new(MockRelay::new(), book(), false, 10);
        let recipient = Address::repeat_byte(0x40);

        let rng = CandidateParameters::Auction(AuctionParams {
            stage: AuctionStage::Rng,
            reward_recipient: recipient,
        });
        executor.execute(&rng, None, 100_000).await;

        let draw = CandidateParameters::Auction(AuctionParams {
            stage: AuctionStage::Draw,
            reward_recipient: recipient,
        });
        executor.execute(&draw, None, 100_000).await;

        let submitted = executor.relay.submitted.lock().unwrap();
        assert_eq!(submitted[0].to, book().rng_auction);
        assert_eq!(submitted[1].to, book().draw_auction);
    }

    #[test]
    fn test_gas_headroom() {
        assert_eq!(with_headroom(200_000), 300_000);
        assert_eq!(with_headroom(0), 0);
    }

    #[test]
    fn test_max_approval_is_int256_max() {
        // 2^255 - 1
        assert_eq!(MAX_APPROVAL, U256::MAX >> 1);
        assert_eq!(MAX_APPROVAL.bit_len(), 255);
    }
}
