//! Gas Cost Estimator
//!
//! Simulates gas for a prospective call and converts it to USD under two
//! independent fee scenarios (current base fee, worst-case max fee) read
//! from network fee data. A failed simulation yields the unknown-cost
//! sentinel (`gas_units == 0`) instead of an error: the caller must treat
//! it as "cannot evaluate profitability, reject", never as zero cost.
//!
//! Author: AI-Generated
//! Created: 2026-07-22
//! Modified: 2026-07-30 - feeHistory scenarios with block-header fallback

use crate::types::CostEstimate;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::eth::FeeHistory;
use alloy::rpc::types::{BlockNumberOrTag, TransactionRequest};
use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Decimal count of the chain's native gas token (wei per whole unit).
pub const NATIVE_DECIMALS: i32 = 18;

/// Blocks sampled for the fee-history read.
const FEE_HISTORY_BLOCKS: u64 = 5;

/// Conservative floors for nodes that return empty fee data.
const DEFAULT_BASE_FEE: u128 = 1_500_000_000; // 1.5 gwei
const DEFAULT_PRIORITY_FEE: u128 = 1_000_000_000; // 1 gwei

/// Two independent per-gas fee scenarios, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeScenarios {
    pub base_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
}

pub struct GasEstimator<P> {
    provider: P,
}

impl<P: Provider + Clone> GasEstimator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Current fee scenarios from `eth_feeHistory`, with a latest-block
    /// header fallback for nodes that disable the endpoint.
    pub async fn fee_scenarios(&self) -> Result<FeeScenarios> {
        match self
            .provider
            .get_fee_history(FEE_HISTORY_BLOCKS, BlockNumberOrTag::Latest, &[50.0f64])
            .await
        {
            Ok(history) => scenarios_from_history(&history),
            Err(e) => {
                debug!("feeHistory unavailable ({}), falling back to block header", e);
                self.fallback_scenarios().await
            }
        }
    }

    /// Estimate gas for `call` and convert to USD. Simulation failure (the
    /// call would revert) returns `CostEstimate::unknown()`; unreachable fee
    /// data is an error, since nothing can be priced without it.
    pub async fn estimate(&self, call: TransactionRequest, native_usd: f64) -> Result<CostEstimate> {
        let fees = self.fee_scenarios().await?;

        let gas_units = match self.provider.estimate_gas(call).await {
            Ok(units) => units,
            Err(e) => {
                debug!("Gas simulation failed: {}", e);
                return Ok(CostEstimate::unknown());
            }
        };

        Ok(cost_from_units(gas_units, &fees, native_usd))
    }

    async fn fallback_scenarios(&self) -> Result<FeeScenarios> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .context("Latest block fetch failed")?;

        let base: u128 = block
            .as_ref()
            .and_then(|b| b.header.base_fee_per_gas)
            .map(|v| v as u128)
            .unwrap_or(DEFAULT_BASE_FEE);

        let priority: u128 = self
            .provider
            .get_max_priority_fee_per_gas()
            .await
            .unwrap_or(DEFAULT_PRIORITY_FEE);

        Ok(FeeScenarios {
            base_fee_per_gas: base,
            max_fee_per_gas: max_fee_from(base, priority),
        })
    }
}

fn scenarios_from_history(history: &FeeHistory) -> Result<FeeScenarios> {
    let base = history
        .latest_block_base_fee()
        .ok_or_else(|| anyhow!("No base fee in fee history"))?;
    let next_base = history.next_block_base_fee().unwrap_or(base);

    // Average p50 tip over the sampled blocks, floored at 1 gwei.
    let mut tip_sum = 0u128;
    let mut tip_count = 0u128;
    if let Some(rewards) = &history.reward {
        for block_reward in rewards {
            if let Some(r) = block_reward.first() {
                tip_sum = tip_sum.saturating_add(*r);
                tip_count += 1;
            }
        }
    }
    let tip = if tip_count > 0 {
        (tip_sum / tip_count).max(DEFAULT_PRIORITY_FEE)
    } else {
        DEFAULT_PRIORITY_FEE
    };

    Ok(FeeScenarios {
        base_fee_per_gas: base,
        max_fee_per_gas: max_fee_from(next_base, tip),
    })
}

/// Worst-case fee scenario: two base-fee doublings of headroom plus the tip.
fn max_fee_from(base: u128, priority: u128) -> u128 {
    base.saturating_mul(2).saturating_add(priority)
}

/// Convert simulated gas units into the USD cost record. `avg_fee_usd` is
/// the arithmetic mean of the base and max scenarios.
pub fn cost_from_units(gas_units: u64, fees: &FeeScenarios, native_usd: f64) -> CostEstimate {
    let base_fee_usd = wei_to_usd(gas_units as u128 * fees.base_fee_per_gas, native_usd);
    let max_fee_usd = wei_to_usd(gas_units as u128 * fees.max_fee_per_gas, native_usd);

    CostEstimate {
        gas_units,
        base_fee_usd,
        max_fee_usd,
        avg_fee_usd: (base_fee_usd + max_fee_usd) / 2.0,
    }
}

fn wei_to_usd(wei: u128, native_usd: f64) -> f64 {
    wei as f64 / 10_f64.powi(NATIVE_DECIMALS) * native_usd
}

/// Build the eth_call / eth_estimateGas request for a prospective call.
pub fn call_request(from: Address, to: Address, data: Bytes) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_to(to)
        .with_input(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_from_units_converts_wei_to_usd() {
        // 400k gas at 30 gwei base / 60 gwei max, native at $0.50:
        // base = 400_000 * 30e9 wei = 0.012 native = $0.006
        let fees = FeeScenarios {
            base_fee_per_gas: 30_000_000_000,
            max_fee_per_gas: 60_000_000_000,
        };
        let cost = cost_from_units(400_000, &fees, 0.50);

        assert_eq!(cost.gas_units, 400_000);
        assert!((cost.base_fee_usd - 0.006).abs() < 1e-12);
        assert!((cost.max_fee_usd - 0.012).abs() < 1e-12);
        assert!((cost.avg_fee_usd - 0.009).abs() < 1e-12);
    }

    #[test]
    fn test_avg_is_mean_of_base_and_max() {
        let fees = FeeScenarios {
            base_fee_per_gas: 7_000_000_000,
            max_fee_per_gas: 21_000_000_000,
        };
        let cost = cost_from_units(123_456, &fees, 1850.0);
        let expected = (cost.base_fee_usd + cost.max_fee_usd) / 2.0;
        assert_eq!(cost.avg_fee_usd, expected);
    }

    #[test]
    fn test_zero_units_is_the_unknown_sentinel() {
        let fees = FeeScenarios {
            base_fee_per_gas: 30_000_000_000,
            max_fee_per_gas: 60_000_000_000,
        };
        let cost = cost_from_units(0, &fees, 0.50);
        assert!(cost.is_unknown());
        assert_eq!(cost.max_fee_usd, 0.0);
    }

    #[test]
    fn test_max_fee_headroom() {
        assert_eq!(max_fee_from(10, 3), 23);
        // Saturates instead of overflowing on absurd inputs
        assert_eq!(max_fee_from(u128::MAX, 1), u128::MAX);
    }
}
