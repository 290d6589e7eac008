//! Context Aggregator
//!
//! Produces the per-opportunity snapshot by batching every read through a
//! single Multicall3 `aggregate3` request, so fields that must be mutually
//! consistent (balance and allowance of the executing account) come from
//! the same block. Snapshots are created fresh each cycle and never cached.
//!
//! Unreachable contracts abort the cycle: no opportunity can be evaluated
//! against a partial snapshot.
//!
//! Author: AI-Generated
//! Created: 2026-07-22
//! Modified: 2026-07-28 - auction snapshot: RNG fee token reads

use crate::config::AddressBook;
use crate::contracts::{
    IClaimer, IDrawAuction, IERC20, ILiquidationPair, IMulticall3, IPrizePool, IRngAuction, IVault,
};
use crate::error::CycleError;
use crate::types::{AuctionSnapshot, ClaimSnapshot, PrizeClaim, SwapSnapshot, TokenInfo};
use alloy::primitives::{address, Address, U256};
use alloy::providers::Provider;
use alloy::sol_types::SolCall;
use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Multicall3 deployed address (same on all EVM chains).
const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

pub struct ContextAggregator<P> {
    provider: P,
    book: AddressBook,
    /// Executing (relayer) account whose balances and allowances are read.
    account: Address,
}

impl<P: Provider + Clone> ContextAggregator<P> {
    pub fn new(provider: P, book: AddressBook, account: Address) -> Self {
        Self {
            provider,
            book,
            account,
        }
    }

    /// Snapshot one liquidation pair: token metadata, the underlying asset of
    /// the yield-bearing output token, the account's input-token balance and
    /// allowance, and the currently swappable output amount.
    pub async fn swap_snapshot(&self, pair: Address) -> Result<SwapSnapshot, CycleError> {
        // Pair-level reads first; the token addresses drive the next batch.
        let results = self
            .aggregate(vec![
                call3(pair, &ILiquidationPair::tokenInCall {}),
                call3(pair, &ILiquidationPair::tokenOutCall {}),
                call3(pair, &ILiquidationPair::maxAmountOutCall {}),
            ])
            .await?;

        let token_in_addr = decode::<ILiquidationPair::tokenInCall>(&results[0], "tokenIn")?;
        let token_out_addr = decode::<ILiquidationPair::tokenOutCall>(&results[1], "tokenOut")?;
        let max_amount_out =
            decode::<ILiquidationPair::maxAmountOutCall>(&results[2], "maxAmountOut")?;

        // Metadata, balance and allowance in one batch. The vault asset()
        // probe is allowed to fail: not every output token is a vault share.
        let mut calls = vec![call3_soft(token_out_addr, &IVault::assetCall {})];
        calls.extend(metadata_calls(token_in_addr));
        calls.extend(metadata_calls(token_out_addr));
        calls.push(call3(
            token_in_addr,
            &IERC20::balanceOfCall {
                account: self.account,
            },
        ));
        calls.push(call3(
            token_in_addr,
            &IERC20::allowanceCall {
                owner: self.account,
                spender: self.book.liquidation_router,
            },
        ));
        let results = self.aggregate(calls).await?;

        let token_in = token_info_from(token_in_addr, &results[1..4])?;
        let token_out = token_info_from(token_out_addr, &results[4..7])?;
        let balance_in = decode::<IERC20::balanceOfCall>(&results[7], "balanceOf")?;
        let allowance_in = decode::<IERC20::allowanceCall>(&results[8], "allowance")?;

        let underlying = match decode_soft::<IVault::assetCall>(&results[0]) {
            Some(asset) if asset != token_out_addr => self.token_info(asset).await?,
            _ => token_out.clone(),
        };

        debug!(
            "Swap snapshot {:?}: {}→{} maxOut={} balance={} allowance={}",
            pair, token_in.symbol, token_out.symbol, max_amount_out, balance_in, allowance_in
        );

        Ok(SwapSnapshot {
            pair,
            token_in,
            token_out,
            underlying,
            balance_in,
            allowance_in,
            max_amount_out,
        })
    }

    /// Snapshot the claim batch for one draw. The total-fee preview is a
    /// static simulation of the claim itself; a revert there means "no fee
    /// to earn" and flows through as zero, not as an error.
    pub async fn claim_snapshot(
        &self,
        draw_id: u32,
        claims: Vec<PrizeClaim>,
    ) -> Result<ClaimSnapshot, CycleError> {
        let results = self
            .aggregate(vec![
                call3(self.book.prize_pool, &IPrizePool::prizeTokenCall {}),
                call3_soft(
                    self.book.claimer,
                    &IClaimer::computeTotalFeesCall {
                        drawId: draw_id,
                        claimCount: U256::from(claims.len()),
                    },
                ),
            ])
            .await?;

        let prize_token_addr = decode::<IPrizePool::prizeTokenCall>(&results[0], "prizeToken")?;
        let total_fees =
            decode_soft::<IClaimer::computeTotalFeesCall>(&results[1]).unwrap_or(U256::ZERO);

        let prize_token = self.token_info(prize_token_addr).await?;

        debug!(
            "Claim snapshot draw {}: {} claims, fee preview {} {}",
            draw_id,
            claims.len(),
            total_fees,
            prize_token.symbol
        );

        Ok(ClaimSnapshot {
            draw_id,
            prize_token,
            claims,
            total_fees,
        })
    }

    /// Snapshot both auction stages: open flags, reward previews, and the
    /// RNG fee token with the account's balance and allowance for it.
    pub async fn auction_snapshot(&self) -> Result<AuctionSnapshot, CycleError> {
        let rng = self.book.rng_auction;
        let draw = self.book.draw_auction;

        let results = self
            .aggregate(vec![
                call3(rng, &IRngAuction::isAuctionOpenCall {}),
                call3(rng, &IRngAuction::currentRewardAmountCall {}),
                call3_soft(rng, &IRngAuction::getRngFeeCall {}),
                call3(draw, &IDrawAuction::isAuctionOpenCall {}),
                call3(draw, &IDrawAuction::currentRewardAmountCall {}),
                call3(self.book.prize_pool, &IPrizePool::prizeTokenCall {}),
            ])
            .await?;

        let rng_open = decode::<IRngAuction::isAuctionOpenCall>(&results[0], "rng isAuctionOpen")?;
        let rng_reward =
            decode::<IRngAuction::currentRewardAmountCall>(&results[1], "rng reward")?;
        let rng_fee = decode_soft::<IRngAuction::getRngFeeCall>(&results[2]);
        let draw_open =
            decode::<IDrawAuction::isAuctionOpenCall>(&results[3], "draw isAuctionOpen")?;
        let draw_reward =
            decode::<IDrawAuction::currentRewardAmountCall>(&results[4], "draw reward")?;
        let prize_token_addr = decode::<IPrizePool::prizeTokenCall>(&results[5], "prizeToken")?;

        let prize_token = self.token_info(prize_token_addr).await?;

        // The RNG service may charge no fee at all (feeToken == 0).
        let (fee_token_addr, rng_fee_amount) = match rng_fee {
            Some(ret) if ret.feeToken != Address::ZERO => (Some(ret.feeToken), ret.requestFee),
            _ => (None, U256::ZERO),
        };

        let (rng_fee_token, fee_balance, fee_allowance) = match fee_token_addr {
            Some(fee_addr) => {
                let mut calls = metadata_calls(fee_addr);
                calls.push(call3(
                    fee_addr,
                    &IERC20::balanceOfCall {
                        account: self.account,
                    },
                ));
                calls.push(call3(
                    fee_addr,
                    &IERC20::allowanceCall {
                        owner: self.account,
                        spender: rng,
                    },
                ));
                let results = self.aggregate(calls).await?;
                let info = token_info_from(fee_addr, &results[0..3])?;
                let balance = decode::<IERC20::balanceOfCall>(&results[3], "fee balanceOf")?;
                let allowance = decode::<IERC20::allowanceCall>(&results[4], "fee allowance")?;
                (Some(info), balance, allowance)
            }
            None => (None, U256::ZERO, U256::ZERO),
        };

        debug!(
            "Auction snapshot: rng_open={} draw_open={} rng_reward={} draw_reward={}",
            rng_open, draw_open, rng_reward, draw_reward
        );

        Ok(AuctionSnapshot {
            rng_open,
            draw_open,
            rng_reward,
            draw_reward,
            prize_token,
            rng_fee_token,
            rng_fee_amount,
            fee_balance,
            fee_allowance,
        })
    }

    /// Latest completed (awarded) draw id from the prize pool.
    pub async fn latest_draw_id(&self) -> Result<u32, CycleError> {
        IPrizePool::new(self.book.prize_pool, &self.provider)
            .getLastAwardedDrawId()
            .call()
            .await
            .map_err(|e| CycleError::ContractUnreachable(e.to_string()))
    }

    /// Fetch metadata for a single token in one batch.
    async fn token_info(&self, token: Address) -> Result<TokenInfo, CycleError> {
        let results = self.aggregate(metadata_calls(token)).await?;
        Ok(token_info_from(token, &results)?)
    }

    async fn aggregate(
        &self,
        calls: Vec<IMulticall3::Call3>,
    ) -> Result<Vec<IMulticall3::Result>, CycleError> {
        let multicall = IMulticall3::new(MULTICALL3_ADDRESS, &self.provider);
        multicall
            .aggregate3(calls)
            .call()
            .await
            .map_err(|e| CycleError::ContractUnreachable(e.to_string()))
    }
}

/// Wrap an encoded sub-call; the whole batch reverts if this one fails.
fn call3<C: SolCall>(target: Address, call: &C) -> IMulticall3::Call3 {
    IMulticall3::Call3 {
        target,
        allowFailure: false,
        callData: call.abi_encode().into(),
    }
}

/// Wrap an encoded sub-call that is allowed to fail (probe reads).
fn call3_soft<C: SolCall>(target: Address, call: &C) -> IMulticall3::Call3 {
    IMulticall3::Call3 {
        target,
        allowFailure: true,
        callData: call.abi_encode().into(),
    }
}

/// The three ERC-20 metadata reads, in [name, symbol, decimals] order.
fn metadata_calls(token: Address) -> Vec<IMulticall3::Call3> {
    vec![
        call3(token, &IERC20::nameCall {}),
        call3(token, &IERC20::symbolCall {}),
        call3(token, &IERC20::decimalsCall {}),
    ]
}

fn decode<C: SolCall>(result: &IMulticall3::Result, what: &str) -> Result<C::Return> {
    if !result.success {
        return Err(anyhow!("{} sub-call failed", what));
    }
    C::abi_decode_returns(&result.returnData).with_context(|| format!("{} decode failed", what))
}

/// Decode a soft sub-call, treating failure or garbage as absent.
fn decode_soft<C: SolCall>(result: &IMulticall3::Result) -> Option<C::Return> {
    if !result.success {
        return None;
    }
    C::abi_decode_returns(&result.returnData).ok()
}

/// Assemble TokenInfo from a [name, symbol, decimals] result slice.
fn token_info_from(address: Address, results: &[IMulticall3::Result]) -> Result<TokenInfo> {
    let name = decode::<IERC20::nameCall>(&results[0], "name")?;
    let symbol = decode::<IERC20::symbolCall>(&results[1], "symbol")?;
    let decimals = decode::<IERC20::decimalsCall>(&results[2], "decimals")?;
    Ok(TokenInfo {
        address,
        symbol,
        name,
        decimals,
    })
}
