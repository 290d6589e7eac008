//! Parameter Calculator
//!
//! Derives the exact on-chain call arguments from a snapshot, applying the
//! per-bot policy (fraction of available liquidity for swaps, whole batch
//! for claims, fixed-shape call for auctions). Everything here is a
//! deterministic function of the snapshot plus at most two quote reads
//! against the liquidation mechanism.
//!
//! Author: AI-Generated
//! Created: 2026-07-23
//! Modified: 2026-07-31 - exact-out slippage bound on the swap quote

use crate::contracts::ILiquidationPair;
use crate::error::Rejection;
use crate::types::{
    AuctionParams, AuctionStage, AuctionSnapshot, ClaimParams, ClaimSnapshot, SwapParams,
    SwapSnapshot,
};
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use tracing::debug;

/// Policy knobs for the swap variant.
#[derive(Debug, Clone, Copy)]
pub struct SwapPolicy {
    /// Target wanted = max_amount_out / divisor. Taking only a fraction
    /// leaves room for the pricing curve to quote a favorable input.
    pub divisor: u64,
}

impl Default for SwapPolicy {
    fn default() -> Self {
        Self { divisor: 2 }
    }
}

pub struct ParameterCalculator<P> {
    provider: P,
}

impl<P: Provider + Clone> ParameterCalculator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Derive swap-call arguments. `Ok(None)` means nothing has accrued to
    /// swap this cycle, a normal outcome rather than an error. A revert from the
    /// mechanism's quote simulation is an opportunity-local rejection.
    pub async fn swap_parameters(
        &self,
        snapshot: &SwapSnapshot,
        policy: &SwapPolicy,
        receiver: Address,
    ) -> Result<Option<SwapParams>, Rejection> {
        let wanted = wanted_amount_out(snapshot.max_amount_out, policy.divisor);
        if wanted.is_zero() {
            return Ok(None);
        }

        let pair = ILiquidationPair::new(snapshot.pair, &self.provider);

        let amount_in = pair
            .computeExactAmountIn(wanted)
            .call()
            .await
            .map_err(|e| Rejection::SimulationReverted(e.to_string()))?;

        // Re-quote the output obtainable for that exact input to bound
        // slippage; keep the smaller of the two.
        let amount_out = match pair.computeExactAmountOut(amount_in).call().await {
            Ok(confirmed) => wanted.min(confirmed),
            Err(e) => {
                debug!("computeExactAmountOut unavailable ({}), using wanted", e);
                wanted
            }
        };

        debug!(
            "Swap quote {:?}: out={} in={} ({} {} for {} {})",
            snapshot.pair,
            amount_out,
            amount_in,
            snapshot.token_out.scale_amount(amount_out),
            snapshot.token_out.symbol,
            snapshot.token_in.scale_amount(amount_in),
            snapshot.token_in.symbol,
        );

        Ok(Some(swap_params_from_quote(
            snapshot.pair,
            receiver,
            amount_out,
            amount_in,
        )))
    }
}

/// Fraction of the max obtainable output to target. Zero max short-circuits
/// to zero: yield simply has not accrued yet.
pub fn wanted_amount_out(max_amount_out: U256, divisor: u64) -> U256 {
    if max_amount_out.is_zero() {
        return U256::ZERO;
    }
    max_amount_out / U256::from(divisor.max(1))
}

/// Assemble swap params from a quote. The on-chain input bound is the exact
/// quoted input; the mechanism's curve only moves in the swapper's favor
/// between quote and execution.
pub fn swap_params_from_quote(
    pair: Address,
    receiver: Address,
    amount_out: U256,
    amount_in: U256,
) -> SwapParams {
    SwapParams {
        pair,
        receiver,
        amount_out,
        amount_in,
        amount_in_max: amount_in,
    }
}

/// Claim-call arguments: the full discovered batch for the draw. The
/// per-claim fee floor is half the previewed average, so a front-run that
/// shrinks the batch cannot silently push fees below profitability.
pub fn claim_parameters(snapshot: &ClaimSnapshot, fee_recipient: Address) -> ClaimParams {
    let count = snapshot.claims.len();
    let min_fee_per_claim = if count == 0 {
        U256::ZERO
    } else {
        snapshot.total_fees / U256::from(count) / U256::from(2u8)
    };

    ClaimParams {
        draw_id: snapshot.draw_id,
        claims: snapshot.claims.clone(),
        fee_recipient,
        min_fee_per_claim,
    }
}

/// Which auction stage to complete. The RNG stage takes precedence when
/// both report open (they are mutually exclusive in practice).
pub fn select_auction_stage(rng_open: bool, draw_open: bool) -> Option<AuctionStage> {
    if rng_open {
        Some(AuctionStage::Rng)
    } else if draw_open {
        Some(AuctionStage::Draw)
    } else {
        None
    }
}

/// Auction-call arguments, or `None` when neither stage is open.
pub fn auction_parameters(
    snapshot: &AuctionSnapshot,
    reward_recipient: Address,
) -> Option<AuctionParams> {
    select_auction_stage(snapshot.rng_open, snapshot.draw_open).map(|stage| AuctionParams {
        stage,
        reward_recipient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrizeClaim, TokenInfo};

    fn token(symbol: &str, decimals: u8) -> TokenInfo {
        TokenInfo {
            address: Address::repeat_byte(0xaa),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals,
        }
    }

    #[test]
    fn test_wanted_amount_out_zero_short_circuits() {
        assert_eq!(wanted_amount_out(U256::ZERO, 2), U256::ZERO);
    }

    #[test]
    fn test_wanted_amount_out_applies_divisor() {
        assert_eq!(wanted_amount_out(U256::from(1000u64), 2), U256::from(500u64));
        assert_eq!(wanted_amount_out(U256::from(1000u64), 1), U256::from(1000u64));
        // A zero divisor is clamped rather than panicking
        assert_eq!(wanted_amount_out(U256::from(1000u64), 0), U256::from(1000u64));
    }

    #[test]
    fn test_swap_params_bound_equals_quote() {
        let params = swap_params_from_quote(
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x02),
            U256::from(500u64),
            U256::from(80u64),
        );
        assert_eq!(params.amount_out, U256::from(500u64));
        assert_eq!(params.amount_in, U256::from(80u64));
        assert_eq!(params.amount_in_max, params.amount_in);
    }

    #[test]
    fn test_claim_parameters_take_whole_batch() {
        let claims: Vec<PrizeClaim> = (0..4u32)
            .map(|i| PrizeClaim {
                vault: Address::repeat_byte(0x10),
                winner: Address::repeat_byte(i as u8 + 1),
                tier: 1,
                prize_index: i,
            })
            .collect();
        let snapshot = ClaimSnapshot {
            draw_id: 42,
            prize_token: token("POOL", 18),
            claims: claims.clone(),
            total_fees: U256::from(1000u64),
        };

        let params = claim_parameters(&snapshot, Address::repeat_byte(0xfe));
        assert_eq!(params.draw_id, 42);
        assert_eq!(params.claims, claims);
        // Half the previewed average fee: 1000 / 4 / 2
        assert_eq!(params.min_fee_per_claim, U256::from(125u64));
    }

    #[test]
    fn test_claim_parameters_empty_batch_has_zero_floor() {
        let snapshot = ClaimSnapshot {
            draw_id: 7,
            prize_token: token("POOL", 18),
            claims: Vec::new(),
            total_fees: U256::ZERO,
        };
        let params = claim_parameters(&snapshot, Address::ZERO);
        assert_eq!(params.min_fee_per_claim, U256::ZERO);
    }

    #[test]
    fn test_rng_stage_takes_precedence() {
        // Both stages reporting open selects the RNG stage
        assert_eq!(select_auction_stage(true, true), Some(AuctionStage::Rng));
        assert_eq!(select_auction_stage(true, false), Some(AuctionStage::Rng));
        assert_eq!(select_auction_stage(false, true), Some(AuctionStage::Draw));
        assert_eq!(select_auction_stage(false, false), None);
    }

    #[test]
    fn test_parameter_derivation_is_deterministic() {
        let snapshot = ClaimSnapshot {
            draw_id: 9,
            prize_token: token("POOL", 18),
            claims: vec![PrizeClaim {
                vault: Address::repeat_byte(0x10),
                winner: Address::repeat_byte(0x20),
                tier: 0,
                prize_index: 0,
            }],
            total_fees: U256::from(600u64),
        };
        let recipient = Address::repeat_byte(0xfe);
        assert_eq!(
            claim_parameters(&snapshot, recipient),
            claim_parameters(&snapshot, recipient)
        );

        let a = swap_params_from_quote(
            Address::repeat_byte(0x01),
            recipient,
            U256::from(500u64),
            U256::from(80u64),
        );
        let b = swap_params_from_quote(
            Address::repeat_byte(0x01),
            recipient,
            U256::from(500u64),
            U256::from(80u64),
        );
        assert_eq!(a, b);
    }
}
