//! Keeper bot cycles
//!
//! One module per bot variant, each wiring the same pipeline with its own
//! on-chain calls, reward formula and cost basis. A cycle is one pass over
//! the discovered opportunities, strictly sequential: the relayer account's
//! nonce is a globally ordered shared resource, and an approval must
//! confirm before the dependent submission is safe.
//!
//! Author: AI-Generated
//! Created: 2026-07-25

pub mod claimer;
pub mod draw;
pub mod liquidator;

use crate::config::{AddressBook, BotSettings};
use crate::error::CycleError;
use crate::executor::TransactionExecutor;
use crate::oracle::PriceOracle;
use crate::pipeline::profit::round2;
use crate::pipeline::{ContextAggregator, GasEstimator, ParameterCalculator};
use crate::types::{CycleSummary, OpportunityOutcome, OutcomeRecord};
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use tracing::info;

/// Everything one cycle needs, passed explicitly into each invocation.
/// There is no ambient or global relayer state.
pub struct BotContext<P, R, D> {
    pub settings: BotSettings,
    pub book: AddressBook,
    /// Relayer account executing the actions.
    pub account: Address,
    pub oracle: PriceOracle<P>,
    pub aggregator: ContextAggregator<P>,
    pub calculator: ParameterCalculator<P>,
    pub gas: GasEstimator<P>,
    pub executor: TransactionExecutor<R>,
    pub discovery: D,
}

// Trait bounds live on the per-bot run_cycle functions; the struct itself
// is just a bundle, so tests can substitute mock relays and discovery.
pub(crate) fn summarize(
    bot: &str,
    started_at: DateTime<Utc>,
    outcomes: Vec<OutcomeRecord>,
) -> CycleSummary {
    CycleSummary {
        bot: bot.to_string(),
        started_at,
        finished_at: Utc::now(),
        outcomes,
    }
}

/// Zero discovered entities is fatal: an empty cycle is indistinguishable
/// from a broken discovery source, and acting on it would mask the latter.
pub(crate) fn ensure_discovered<T>(items: Vec<T>) -> Result<Vec<T>, CycleError> {
    if items.is_empty() {
        Err(CycleError::NothingDiscovered)
    } else {
        Ok(items)
    }
}

/// Per-cycle summary: one line per opportunity, then the realized total.
pub fn log_summary(summary: &CycleSummary) {
    info!("=== {} cycle summary ===", summary.bot);
    for record in &summary.outcomes {
        match &record.outcome {
            OpportunityOutcome::Executed {
                tx_hash,
                net_profit_usd,
            } => info!(
                "  {} | EXECUTED ${:.2} | tx {:?}",
                record.label,
                round2(*net_profit_usd),
                tx_hash
            ),
            OpportunityOutcome::DryRun { net_profit_usd } => info!(
                "  {} | DRY RUN, would capture ${:.2}",
                record.label,
                round2(*net_profit_usd)
            ),
            OpportunityOutcome::Rejected { reason } => {
                info!("  {} | rejected: {}", record.label, reason)
            }
            OpportunityOutcome::Failed { reason } => {
                info!("  {} | FAILED: {}", record.label, reason)
            }
        }
    }
    info!(
        "Realized profit this cycle: ${:.2}",
        round2(summary.realized_profit_usd())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_discovered_entities_is_fatal() {
        let result = ensure_discovered(Vec::<Address>::new());
        assert!(matches!(result, Err(CycleError::NothingDiscovered)));
    }

    #[test]
    fn test_nonempty_discovery_passes_through() {
        let pairs = vec![Address::repeat_byte(0x01), Address::repeat_byte(0x02)];
        let result = ensure_discovered(pairs.clone()).unwrap();
        assert_eq!(result, pairs);
    }
}
