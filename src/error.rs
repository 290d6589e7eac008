//! Error taxonomy for the evaluation cycle
//!
//! Two tiers: `CycleError` aborts the whole cycle (no opportunity can be
//! safely evaluated), `Rejection` is scoped to a single opportunity and
//! evaluation continues with the next one. Execution failures after a
//! profitable decision are recorded in the opportunity outcome, not raised.
//!
//! Author: AI-Generated
//! Created: 2026-07-21

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Fatal, cycle-aborting conditions. The process exits nonzero and the next
/// scheduled invocation retries from a clean snapshot.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("discovery returned no opportunities")]
    NothingDiscovered,

    #[error("price feed has no USD rate for token {token}: {reason}")]
    MissingRate { token: Address, reason: String },

    #[error("required contract read failed: {0}")]
    ContractUnreachable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Opportunity-local, recoverable conditions. Recorded per opportunity;
/// never propagated past the opportunity boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("nothing accrued to swap (max amount out is zero)")]
    NothingAccrued,

    #[error("no auction stage is open")]
    NoOpenAuction,

    #[error("gas simulation failed, cannot evaluate profitability")]
    GasUnknown,

    #[error("insufficient {symbol} balance, short {shortfall}")]
    InsufficientFunds { symbol: String, shortfall: U256 },

    #[error("not profitable: net ${net:.2} at threshold ${threshold:.2}")]
    NotProfitable { net: f64, threshold: f64 },

    #[error("static simulation reverted: {0}")]
    SimulationReverted(String),
}
