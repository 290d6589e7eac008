//! Liquidation arbitrage cycle
//!
//! For each discovered liquidation pair: snapshot the pair, derive the swap
//! amounts under the divisor policy, verify the relayer holds enough input
//! token, price the gas, and swap when the USD spread beats the worst-case
//! gas scenario by more than the configured threshold.
//!
//! Opportunities are evaluated strictly in discovery order; one pair's
//! failure never aborts the rest of the cycle.
//!
//! Author: AI-Generated
//! Created: 2026-07-25
//! Modified: 2026-08-02 - fresh balance/allowance reads per pair

use super::{ensure_discovered, summarize, BotContext};
use crate::discovery::Discovery;
use crate::error::{CycleError, Rejection};
use crate::executor::{candidate_call, AllowanceState};
use crate::pipeline::{call_request, check_sufficiency, decide, CostBasis, SwapPolicy};
use crate::relay::Relay;
use crate::types::{CandidateParameters, CycleSummary, OpportunityOutcome, OutcomeRecord};
use alloy::primitives::Address;
use alloy::providers::Provider;
use chrono::Utc;
use tracing::{info, warn};

pub async fn run_cycle<P, R, D>(ctx: &BotContext<P, R, D>) -> Result<CycleSummary, CycleError>
where
    P: Provider + Clone,
    R: Relay,
    D: Discovery,
{
    let started_at = Utc::now();

    let native_usd = ctx.oracle.native_rate_usd().await?;
    let pairs = ensure_discovered(ctx.discovery.liquidation_pairs().await?)?;
    info!("Evaluating {} liquidation pairs", pairs.len());

    let policy = SwapPolicy {
        divisor: ctx.settings.swap_divisor,
    };

    let mut outcomes = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let outcome = evaluate_pair(ctx, pair, &policy, native_usd).await?;
        outcomes.push(OutcomeRecord {
            label: format!("{:?}", pair),
            outcome,
        });
    }

    Ok(summarize("liquidator", started_at, outcomes))
}

/// Evaluate one pair. Opportunity-local conditions come back as an outcome;
/// only cycle-fatal errors (unreachable contracts, missing rates) propagate.
async fn evaluate_pair<P, R, D>(
    ctx: &BotContext<P, R, D>,
    pair: Address,
    policy: &SwapPolicy,
    native_usd: f64,
) -> Result<OpportunityOutcome, CycleError>
where
    P: Provider + Clone,
    R: Relay,
    D: Discovery,
{
    // Balance and allowance are read fresh here, after any prior pair's
    // approval or swap may have changed them.
    let snapshot = ctx.aggregator.swap_snapshot(pair).await?;

    let in_rate = ctx.oracle.rate_usd(snapshot.token_in.address).await?;
    // The output token is a vault share priced via its underlying asset.
    let out_rate = ctx.oracle.rate_usd(snapshot.underlying.address).await?;

    let params = match ctx
        .calculator
        .swap_parameters(&snapshot, policy, ctx.settings.recipient)
        .await
    {
        Ok(Some(params)) => params,
        Ok(None) => return Ok(rejected(Rejection::NothingAccrued)),
        Err(rejection) => return Ok(rejected(rejection)),
    };

    let funds = check_sufficiency(snapshot.balance_in, params.amount_in);
    if !funds.sufficient {
        warn!(
            "Insufficient {} for {:?}: balance {}, required {}, shortfall {}",
            snapshot.token_in.symbol, pair, snapshot.balance_in, params.amount_in, funds.shortfall
        );
        return Ok(rejected(Rejection::InsufficientFunds {
            symbol: snapshot.token_in.symbol.clone(),
            shortfall: funds.shortfall,
        }));
    }

    let candidate = CandidateParameters::Swap(params.clone());
    let (to, data) = candidate_call(&candidate, &ctx.book);
    let cost = ctx
        .gas
        .estimate(call_request(ctx.account, to, data), native_usd)
        .await?;
    if cost.is_unknown() {
        return Ok(rejected(Rejection::GasUnknown));
    }

    let out_usd = snapshot.token_out.scale_amount(params.amount_out) * out_rate;
    let in_usd = snapshot.token_in.scale_amount(params.amount_in) * in_rate;
    let reward_usd = out_usd - in_usd;

    let decision = decide(reward_usd, &cost, CostBasis::Max, ctx.settings.min_profit_usd);
    info!(
        "{:?} {}→{}: gross ${:.2}, gas(max) ${:.2}, net ${:.2}",
        pair,
        snapshot.token_in.symbol,
        snapshot.token_out.symbol,
        decision.gross_profit_usd,
        cost.max_fee_usd,
        decision.net_profit_usd
    );

    if !decision.profitable {
        return Ok(rejected(Rejection::NotProfitable {
            net: decision.net_profit_usd,
            threshold: ctx.settings.min_profit_usd,
        }));
    }

    if ctx.settings.dry_run {
        info!("DRY RUN: would swap {} out of {:?}", params.amount_out, pair);
        return Ok(OpportunityOutcome::DryRun {
            net_profit_usd: decision.net_profit_usd,
        });
    }

    let allowance = AllowanceState {
        token: snapshot.token_in.address,
        spender: ctx.book.liquidation_router,
        current: snapshot.allowance_in,
        required: params.amount_in_max,
    };

    let result = ctx
        .executor
        .execute(&candidate, Some(&allowance), cost.gas_units)
        .await;

    Ok(match result.transaction_hash {
        Some(tx_hash) if result.success => OpportunityOutcome::Executed {
            tx_hash,
            net_profit_usd: decision.net_profit_usd,
        },
        _ => OpportunityOutcome::Failed {
            reason: result
                .error_reason
                .unwrap_or_else(|| "unknown execution failure".to_string()),
        },
    })
}

fn rejected(rejection: Rejection) -> OpportunityOutcome {
    OpportunityOutcome::Rejected {
        reason: rejection.to_string(),
    }
}
