//! RNG / draw auction cycle
//!
//! A single opportunity per cycle: complete whichever auction stage is open,
//! RNG stage first. The reward decays over the auction window, so the same
//! evaluation naturally flips to profitable as later invocations see a
//! larger reward. Starting the RNG stage may require paying the RNG
//! service's fee token, which needs a balance and an allowance.
//!
//! Author: AI-Generated
//! Created: 2026-07-26

use super::{summarize, BotContext};
use crate::discovery::Discovery;
use crate::error::{CycleError, Rejection};
use crate::executor::{candidate_call, AllowanceState};
use crate::pipeline::params::auction_parameters;
use crate::pipeline::{call_request, check_sufficiency, decide, CostBasis};
use crate::relay::Relay;
use crate::types::{
    AuctionSnapshot, AuctionStage, CandidateParameters, CycleSummary, OpportunityOutcome,
    OutcomeRecord,
};
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
    let snapshot = ctx.aggregator.auction_snapshot().await?;

    let (label, outcome) = match auction_parameters(&snapshot, ctx.settings.recipient) {
        Some(params) => (
            format!("auction-{}", params.stage),
            evaluate(ctx, &snapshot, params, native_usd).await?,
        ),
        None => (
            "auction".to_string(),
            OpportunityOutcome::Rejected {
                reason: Rejection::NoOpenAuction.to_string(),
            },
        ),
    };

    Ok(summarize(
        "drawkeeper",
        started_at,
        vec![OutcomeRecord { label, outcome }],
    ))
}

async fn evaluate<P, R, D>(
    ctx: &BotContext<P, R, D>,
    snapshot: &AuctionSnapshot,
    params: crate::types::AuctionParams,
    native_usd: f64,
) -> Result<OpportunityOutcome, CycleError>
where
    P: Provider + Clone,
    R: Relay,
    D: Discovery,
{
    let stage = params.stage;

    // Starting the RNG stage pays the service fee from the relayer account.
    let mut allowance = None;
    if stage == AuctionStage::Rng {
        if let Some(fee_token) = &snapshot.rng_fee_token {
            let funds = check_sufficiency(snapshot.fee_balance, snapshot.rng_fee_amount);
            if !funds.sufficient {
                warn!(
                    "Insufficient {} for RNG fee: balance {}, required {}, shortfall {}",
                    fee_token.symbol, snapshot.fee_balance, snapshot.rng_fee_amount, funds.shortfall
                );
                return Ok(OpportunityOutcome::Rejected {
                    reason: Rejection::InsufficientFunds {
                        symbol: fee_token.symbol.clone(),
                        shortfall: funds.shortfall,
                    }
                    .to_string(),
                });
            }
            allowance = Some(AllowanceState {
                token: fee_token.address,
                spender: ctx.book.rng_auction,
                current: snapshot.fee_allowance,
                required: snapshot.rng_fee_amount,
            });
        }
    }

    let candidate = CandidateParameters::Auction(params);

    let (to, data) = candidate_call(&candidate, &ctx.book);
    let cost = ctx
        .gas
        .estimate(call_request(ctx.account, to, data), native_usd)
        .await?;
    if cost.is_unknown() {
        return Ok(OpportunityOutcome::Rejected {
            reason: Rejection::GasUnknown.to_string(),
        });
    }

    let prize_rate = ctx.oracle.rate_usd(snapshot.prize_token.address).await?;
    let reward_amount = match stage {
        AuctionStage::Rng => snapshot.rng_reward,
        AuctionStage::Draw => snapshot.draw_reward,
    };
    let reward_usd = snapshot.prize_token.scale_amount(reward_amount) * prize_rate;

    let decision = decide(reward_usd, &cost, CostBasis::Max, ctx.settings.min_profit_usd);
    info!(
        "{} auction: reward ${:.2}, gas(max) ${:.2}, net ${:.2}",
        stage, decision.gross_profit_usd, cost.max_fee_usd, decision.net_profit_usd
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
        info!("DRY RUN: would complete the {} auction stage", stage);
        return Ok(OpportunityOutcome::DryRun {
            net_profit_usd: decision.net_profit_usd,
        });
    }

    let result = ctx
        .executor
        .execute(&candidate, allowance.as_ref(), cost.gas_units)
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
