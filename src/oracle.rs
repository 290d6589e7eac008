//! Price Oracle Adapter
//!
//! Resolves USD market rates for arbitrary tokens and the chain's native gas
//! token from the on-chain market-rate feed contract. The feed stores rates
//! as 8-decimal fixed-point integers.
//!
//! A missing rate is fatal for the cycle: profit math with a silently
//! substituted zero rate would approve or reject opportunities on garbage.
//!
//! Author: AI-Generated
//! Created: 2026-07-22

use crate::contracts::IMarketRate;
use crate::error::CycleError;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use tracing::debug;

/// Fixed decimal precision of the market-rate feed.
pub const MARKET_RATE_DECIMALS: u32 = 8;

pub struct PriceOracle<P> {
    provider: P,
    feed: Address,
    wrapped_native: Address,
}

impl<P: Provider + Clone> PriceOracle<P> {
    pub fn new(provider: P, feed: Address, wrapped_native: Address) -> Self {
        Self {
            provider,
            feed,
            wrapped_native,
        }
    }

    /// USD rate for one whole unit of `token`. Fails (cycle-fatally) when the
    /// feed has no entry for the token.
    pub async fn rate_usd(&self, token: Address) -> Result<f64, CycleError> {
        let feed = IMarketRate::new(self.feed, &self.provider);
        let raw = feed
            .priceFeed(token, "USD".to_string())
            .call()
            .await
            .map_err(|e| CycleError::MissingRate {
                token,
                reason: e.to_string(),
            })?;

        let rate = scale_rate(raw);
        debug!("Rate {:?}: ${:.4}/unit", token, rate);
        Ok(rate)
    }

    /// USD rate of the chain's native gas token, via its wrapped form.
    pub async fn native_rate_usd(&self) -> Result<f64, CycleError> {
        self.rate_usd(self.wrapped_native).await
    }
}

/// Scale an 8-decimal fixed-point feed answer to a decimal USD rate.
pub fn scale_rate(raw: U256) -> f64 {
    raw.saturating_to::<u128>() as f64 / 10_f64.powi(MARKET_RATE_DECIMALS as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rate_one_dollar() {
        // 1.00 USD at 8 decimals
        assert_eq!(scale_rate(U256::from(100_000_000u64)), 1.0);
    }

    #[test]
    fn test_scale_rate_fractional() {
        // 0.50 USD
        assert_eq!(scale_rate(U256::from(50_000_000u64)), 0.5);
        // 3421.87 USD
        assert_eq!(scale_rate(U256::from(342_187_000_000u64)), 3421.87);
    }

    #[test]
    fn test_scale_rate_zero_passes_through() {
        // A literal zero answer flows through; a zero reward rate simply
        // yields an unprofitable decision downstream. Only a failed read
        // is fatal.
        assert_eq!(scale_rate(U256::ZERO), 0.0);
    }
}
