//! Prize claim cycle
//!
//! One opportunity per cycle: the full batch of discovered unclaimed wins
//! for the latest completed draw. The reward is the claim-fee total the
//! claimer contract previews for the batch, decided against the average
//! fee scenario: claim margins are wide enough that the worst-case
//! scenario over-rejects in practice.
//!
//! Author: AI-Generated
//! Created: 2026-07-25

use super::{ensure_discovered, summarize, BotContext};
use crate::discovery::Discovery;
use crate::error::{CycleError, Rejection};
use crate::executor::candidate_call;
use crate::pipeline::params::claim_parameters;
use crate::pipeline::{call_request, decide, CostBasis};
use crate::relay::Relay;
use crate::types::{CandidateParameters, CycleSummary, OpportunityOutcome, OutcomeRecord};
use alloy::providers::Provider;
use chrono::Utc;
use tracing::info;

pub async fn run_cycle<P, R, D>(ctx: &BotContext<P, R, D>) -> Result<CycleSummary, CycleError>
where
    P: Provider + Clone,
    R: Relay,
    D: Discovery,
{
    let started_at = Utc::now();

    let native_usd = ctx.oracle.native_rate_usd().await?;
    let draw_id = ctx.aggregator.latest_draw_id().await?;

    // Zero winners for a completed draw means the discovery source has not
    // indexed it yet; abort rather than submit a pointless claim.
    let winners = ensure_discovered(ctx.discovery.claim_winners(draw_id).await?)?;
    info!("Draw {}: {} unclaimed wins discovered", draw_id, winners.len());

    let snapshot = ctx.aggregator.claim_snapshot(draw_id, winners).await?;
    let prize_rate = ctx.oracle.rate_usd(snapshot.prize_token.address).await?;

    let label = format!("draw-{}", draw_id);
    let outcome = evaluate(ctx, &snapshot, prize_rate, native_usd).await?;

    Ok(summarize(
        "claimer",
        started_at,
        vec![OutcomeRecord { label, outcome }],
    ))
}

async fn evaluate<P, R, D>(
    ctx: &BotContext<P, R, D>,
    snapshot: &crate::types::ClaimSnapshot,
    prize_rate: f64,
    native_usd: f64,
) -> Result<OpportunityOutcome, CycleError>
where
    P: Provider + Clone,
    R: Relay,
    D: Discovery,
{
    let params = claim_parameters(snapshot, ctx.settings.recipient);
    let candidate = CandidateParameters::Claim(params);

    let (to, data) = candidate_call(&candidate, &ctx.book);
    let cost = ctx
        .gas
        .estimate(call_request(ctx.account, to, data), native_usd)
        .await?;
    if cost.is_unknown() {
        // The claim itself would revert (already claimed, draw expired)
        return Ok(OpportunityOutcome::Rejected {
            reason: Rejection::GasUnknown.to_string(),
        });
    }

    let reward_usd = snapshot.prize_token.scale_amount(snapshot.total_fees) * prize_rate;
    let decision = decide(reward_usd, &cost, CostBasis::Avg, ctx.settings.min_profit_usd);
    info!(
        "Draw {}: {} claims, fees ${:.2}, gas(avg) ${:.2}, net ${:.2}",
        snapshot.draw_id,
        snapshot.claims.len(),
        decision.gross_profit_usd,
        cost.avg_fee_usd,
        decision.net_profit_usd
    );

    if !decision.profitable {
        return Ok(OpportunityOutcome::Rejected {
            reason: Rejection::NotProfitable {
                net: decision.net_profit_usd,
                threshold: ctx.settings.min_profit_usd,
            }
            .to_string(),
        });
    }

    if ctx.settings.dry_run {
        info!(
            "DRY RUN: would claim {} prizes for draw {}",
            snapshot.claims.len(),
            snapshot.draw_id
        );
        return Ok(OpportunityOutcome::DryRun {
            net_profit_usd: decision.net_profit_usd,
        });
    }

    // Claims need no input token, so no allowance state.
    let result = ctx.executor.execute(&candidate, None, cost.gas_units).await;

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
