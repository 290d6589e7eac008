//! Prize Vault Keeper Bots Library
//!
//! The profitability decision engine behind three keeper bots: liquidation
//! arbitrage swaps, prize-claim batches, and RNG/draw auction completion.
//! Each cycle aggregates on-chain state, derives candidate call parameters,
//! estimates gas in USD, decides against a profit threshold, and only then
//! submits through the relay.
//!
//! Author: AI-Generated
//! Created: 2026-07-21

pub mod bots;
pub mod config;
pub mod contracts;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod oracle;
pub mod pipeline;
pub mod relay;
pub mod types;

// Re-export commonly used types
pub use config::{load_settings, AddressBook, BotSettings};
pub use error::{CycleError, Rejection};
pub use types::{
    BotKind, CandidateParameters, CostEstimate, CycleSummary, ExecutionOutcome,
    OpportunitySnapshot, ProfitResult, TokenInfo,
};
