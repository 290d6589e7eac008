//! Evaluation Pipeline
//!
//! The profitability decision engine, stage by stage: context aggregation,
//! parameter calculation, resource sufficiency, gas cost estimation, and
//! the profitability decision itself. Execution lives in `crate::executor`.
//!
//! Author: AI-Generated
//! Created: 2026-07-22

pub mod context;
pub mod funds;
pub mod gas;
pub mod params;
pub mod profit;

pub use context::ContextAggregator;
pub use funds::{check_sufficiency, SufficiencyReport};
pub use gas::{call_request, GasEstimator};
pub use params::{ParameterCalculator, SwapPolicy};
pub use profit::{decide, CostBasis};
