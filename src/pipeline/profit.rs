//! Profitability Decision
//!
//! A pure, side-effect-free predicate over numeric inputs: net profit is
//! reward minus cost under the selected fee scenario, and an opportunity is
//! profitable only when net exceeds the configured threshold strictly.
//!
//! The cost basis differs by opportunity type on purpose: swaps and auctions
//! decide against the worst-case (max fee) scenario, claims against the
//! average scenario. The asymmetry is operating policy, not an
//! inconsistency.
//!
//! All comparisons run on unrounded values; `round2` exists for display
//! only and must never feed back into the decision.
//!
//! Author: AI-Generated
//! Created: 2026-07-23

use crate::types::{CostEstimate, ProfitResult};

/// Which fee scenario a bot charges against the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBasis {
    /// Worst-case gas price (swap and auction opportunities).
    Max,
    /// Mean of base and max scenarios (claim opportunities).
    Avg,
}

impl CostBasis {
    pub fn cost_usd(&self, estimate: &CostEstimate) -> f64 {
        match self {
            CostBasis::Max => estimate.max_fee_usd,
            CostBasis::Avg => estimate.avg_fee_usd,
        }
    }
}

/// Decide profitability. An unknown cost estimate (failed simulation,
/// `gas_units == 0`) is never profitable regardless of the reward: a call
/// that cannot be priced cannot be safely submitted.
pub fn decide(
    reward_usd: f64,
    cost: &CostEstimate,
    basis: CostBasis,
    min_threshold_usd: f64,
) -> ProfitResult {
    let cost_usd = basis.cost_usd(cost);
    let net = reward_usd - cost_usd;

    ProfitResult {
        gross_profit_usd: reward_usd,
        net_profit_usd: net,
        profitable: !cost.is_unknown() && net > min_threshold_usd,
    }
}

/// Round to two decimals for display. Never used in comparisons.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(base: f64, max: f64) -> CostEstimate {
        CostEstimate {
            gas_units: 250_000,
            base_fee_usd: base,
            max_fee_usd: max,
            avg_fee_usd: (base + max) / 2.0,
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        // reward 105, cost 100, threshold 5.00 → net exactly 5.00 → NOT profitable
        let cost = estimate(80.0, 100.0);
        let at_threshold = decide(105.0, &cost, CostBasis::Max, 5.0);
        assert_eq!(at_threshold.net_profit_usd, 5.0);
        assert!(!at_threshold.profitable);

        // threshold 4.99 → profitable
        let below = decide(105.0, &cost, CostBasis::Max, 4.99);
        assert!(below.profitable);
    }

    #[test]
    fn test_unknown_gas_is_never_profitable() {
        let unknown = CostEstimate::unknown();
        let result = decide(1_000_000.0, &unknown, CostBasis::Max, 1.0);
        assert!(!result.profitable);
        // The numbers are still reported for the summary
        assert_eq!(result.gross_profit_usd, 1_000_000.0);
    }

    #[test]
    fn test_cost_basis_selects_the_scenario() {
        let cost = estimate(10.0, 30.0); // avg = 20
        assert_eq!(CostBasis::Max.cost_usd(&cost), 30.0);
        assert_eq!(CostBasis::Avg.cost_usd(&cost), 20.0);

        // Same reward, different basis, different decision
        let reward = 25.0;
        assert!(!decide(reward, &cost, CostBasis::Max, 0.0).profitable);
        assert!(decide(reward, &cost, CostBasis::Avg, 0.0).profitable);
    }

    #[test]
    fn test_swap_scenario_numbers() {
        // 500 out − 80 in at $1.00 rates → gross 420; max fee $50 → net 370
        let cost = estimate(30.0, 50.0);
        let result = decide(420.0, &cost, CostBasis::Max, 5.0);
        assert_eq!(result.gross_profit_usd, 420.0);
        assert_eq!(result.net_profit_usd, 370.0);
        assert!(result.profitable);
    }

    #[test]
    fn test_rounding_does_not_feed_back() {
        // Net is a hair above threshold; display rounding would show 5.00
        // but the decision compares unrounded values.
        let cost = estimate(90.0, 100.0);
        let result = decide(105.001, &cost, CostBasis::Max, 5.0);
        assert!(result.profitable);
        assert_eq!(round2(result.net_profit_usd), 5.0);

        // And a hair below stays unprofitable even though it displays 5.00
        let result = decide(104.999, &cost, CostBasis::Max, 5.0);
        assert!(!result.profitable);
        assert_eq!(round2(result.net_profit_usd), 5.0);
    }

    #[test]
    fn test_negative_net_reported() {
        let cost = estimate(40.0, 60.0);
        let result = decide(10.0, &cost, CostBasis::Max, 1.0);
        assert!(!result.profitable);
        assert_eq!(result.net_profit_usd, -50.0);
    }
}
