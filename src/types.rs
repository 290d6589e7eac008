//! Core data structures for the evaluation pipeline
//!
//! Everything here is created and consumed within a single evaluation cycle
//! for a single opportunity. There is no persisted state between cycles;
//! the chain itself is the only durable state.
//!
//! Author: AI-Generated
//! Created: 2026-07-21
//! Modified: 2026-07-24 - Tagged snapshot/parameter variants per bot

use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Which keeper bot is running. Selects the pipeline wiring and the
/// cost-basis policy for the profitability decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BotKind {
    /// Arbitrage swaps against liquidation pairs
    Liquidator,
    /// Prize-claim batches for the latest completed draw
    Claimer,
    /// RNG / draw auction completion
    Drawkeeper,
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BotKind::Liquidator => write!(f, "liquidator"),
            BotKind::Claimer => write!(f, "claimer"),
            BotKind::Drawkeeper => write!(f, "drawkeeper"),
        }
    }
}

/// ERC-20 token metadata. Immutable once fetched; `decimals` governs all
/// fixed-point ↔ display conversions for the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl TokenInfo {
    /// Convert a raw fixed-point amount of this token to a decimal value.
    pub fn scale_amount(&self, amount: U256) -> f64 {
        amount.saturating_to::<u128>() as f64 / 10_f64.powi(self.decimals as i32)
    }
}

/// One discovered prize claim (winner × tier × prize index within a vault).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrizeClaim {
    pub vault: Address,
    pub winner: Address,
    pub tier: u8,
    pub prize_index: u32,
}

/// Auction stage to complete. RNG takes precedence when both report open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuctionStage {
    Rng,
    Draw,
}

impl fmt::Display for AuctionStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuctionStage::Rng => write!(f, "RNG"),
            AuctionStage::Draw => write!(f, "draw"),
        }
    }
}

// ── Snapshots (read-only, one per opportunity per cycle) ─────────────

/// Per-cycle snapshot for one liquidation pair.
#[derive(Debug, Clone)]
pub struct SwapSnapshot {
    pub pair: Address,
    pub token_in: TokenInfo,
    pub token_out: TokenInfo,
    /// Underlying asset of the yield-bearing output token. Falls back to
    /// `token_out` itself when the output is not a vault share.
    pub underlying: TokenInfo,
    /// Executing account's input-token balance, read in the same block as
    /// the allowance below.
    pub balance_in: U256,
    /// Input-token allowance granted to the liquidation router.
    pub allowance_in: U256,
    pub max_amount_out: U256,
}

/// Per-cycle snapshot for the claim batch of the latest completed draw.
#[derive(Debug, Clone)]
pub struct ClaimSnapshot {
    pub draw_id: u32,
    pub prize_token: TokenInfo,
    pub claims: Vec<PrizeClaim>,
    /// On-chain preview of the total claim fees the batch would earn.
    pub total_fees: U256,
}

/// Per-cycle snapshot of the two-stage RNG/draw auction.
#[derive(Debug, Clone)]
pub struct AuctionSnapshot {
    pub rng_open: bool,
    pub draw_open: bool,
    pub rng_reward: U256,
    pub draw_reward: U256,
    pub prize_token: TokenInfo,
    /// Fee token the RNG service charges to start a request, if any.
    pub rng_fee_token: Option<TokenInfo>,
    pub rng_fee_amount: U256,
    /// Executing account's fee-token balance and allowance to the RNG
    /// auction, read in the same block.
    pub fee_balance: U256,
    pub fee_allowance: U256,
}

/// Tagged per-opportunity snapshot, resolved by pattern matching.
#[derive(Debug, Clone)]
pub enum OpportunitySnapshot {
    Swap(SwapSnapshot),
    Claim(ClaimSnapshot),
    Auction(AuctionSnapshot),
}

// ── Candidate parameters (exact call argument tuples) ────────────────

/// Arguments for `swapExactAmountOut` on the liquidation router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub pair: Address,
    pub receiver: Address,
    pub amount_out: U256,
    /// Exact input the mechanism quoted for `amount_out`.
    pub amount_in: U256,
    /// Upper bound passed on-chain; equal to the exact quote.
    pub amount_in_max: U256,
}

/// Arguments for `claimPrizes` on the claimer contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimParams {
    pub draw_id: u32,
    pub claims: Vec<PrizeClaim>,
    pub fee_recipient: Address,
    /// Floor under the per-claim fee so a front-run partial claim cannot
    /// turn the batch unprofitable.
    pub min_fee_per_claim: U256,
}

/// Arguments for the fixed-shape auction completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionParams {
    pub stage: AuctionStage,
    pub reward_recipient: Address,
}

/// Tagged candidate parameters, derived deterministically from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateParameters {
    Swap(SwapParams),
    Claim(ClaimParams),
    Auction(AuctionParams),
}

// ── Cost / profit / outcome records ──────────────────────────────────

/// Gas cost estimate under base/max/average fee scenarios.
/// `gas_units == 0` is the "simulation failed, unknown cost" sentinel;
/// callers must treat it as "cannot evaluate, reject", never as free gas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub gas_units: u64,
    pub base_fee_usd: f64,
    pub max_fee_usd: f64,
    pub avg_fee_usd: f64,
}

impl CostEstimate {
    pub fn unknown() -> Self {
        Self {
            gas_units: 0,
            base_fee_usd: 0.0,
            max_fee_usd: 0.0,
            avg_fee_usd: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.gas_units == 0
    }
}

/// Result of the profitability decision. Comparisons are made on the
/// unrounded values; rounding is for display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitResult {
    pub gross_profit_usd: f64,
    pub net_profit_usd: f64,
    pub profitable: bool,
}

/// Result of one relay submission attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub transaction_hash: Option<TxHash>,
    pub error_reason: Option<String>,
}

impl ExecutionOutcome {
    pub fn confirmed(hash: TxHash) -> Self {
        Self {
            success: true,
            transaction_hash: Some(hash),
            error_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_hash: None,
            error_reason: Some(reason.into()),
        }
    }
}

/// Final disposition of one opportunity within a cycle.
#[derive(Debug, Clone, Serialize)]
pub enum OpportunityOutcome {
    /// Transaction confirmed; net profit as decided before submission.
    Executed { tx_hash: TxHash, net_profit_usd: f64 },
    /// Profitable, but dry-run mode suppressed submission.
    DryRun { net_profit_usd: f64 },
    /// Rejected before execution with a specific reason.
    Rejected { reason: String },
    /// Execution failed after a profitable decision.
    Failed { reason: String },
}

/// One labelled outcome per opportunity per cycle.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub label: String,
    pub outcome: OpportunityOutcome,
}

/// Per-cycle summary: one record per opportunity plus the realized total.
/// An external reporting layer renders this; the core only logs it.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub bot: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<OutcomeRecord>,
}

impl CycleSummary {
    /// Sum of net profit across executed opportunities.
    pub fn realized_profit_usd(&self) -> f64 {
        self.outcomes
            .iter()
            .map(|r| match r.outcome {
                OpportunityOutcome::Executed { net_profit_usd, .. } => net_profit_usd,
                _ => 0.0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_amount_respects_decimals() {
        let usdc = TokenInfo {
            address: Address::ZERO,
            symbol: "USDC".to_string(),
            name: "USD Coin".to_string(),
            decimals: 6,
        };
        assert_eq!(usdc.scale_amount(U256::from(1_500_000u64)), 1.5);

        let weth = TokenInfo {
            address: Address::ZERO,
            symbol: "WETH".to_string(),
            name: "Wrapped Ether".to_string(),
            decimals: 18,
        };
        assert_eq!(weth.scale_amount(U256::from(10).pow(U256::from(18))), 1.0);
    }

    #[test]
    fn test_cost_estimate_unknown_sentinel() {
        let unknown = CostEstimate::unknown();
        assert!(unknown.is_unknown());

        let known = CostEstimate {
            gas_units: 21_000,
            base_fee_usd: 0.01,
            max_fee_usd: 0.02,
            avg_fee_usd: 0.015,
        };
        assert!(!known.is_unknown());
    }

    #[test]
    fn test_realized_profit_sums_executed_only() {
        let summary = CycleSummary {
            bot: "liquidator".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes: vec![
                OutcomeRecord {
                    label: "pair-a".to_string(),
                    outcome: OpportunityOutcome::Executed {
                        tx_hash: TxHash::ZERO,
                        net_profit_usd: 12.5,
                    },
                },
                OutcomeRecord {
                    label: "pair-b".to_string(),
                    outcome: OpportunityOutcome::Rejected {
                        reason: "not profitable".to_string(),
                    },
                },
                OutcomeRecord {
                    label: "pair-c".to_string(),
                    outcome: OpportunityOutcome::DryRun { net_profit_usd: 3.0 },
                },
            ],
        };
        assert_eq!(summary.realized_profit_usd(), 12.5);
    }
}
