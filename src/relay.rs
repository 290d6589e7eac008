//! Transaction relay boundary
//!
//! The sole mutation path to the outside world. The `Relay` trait accepts a
//! destination, payload, gas limit and privacy flag and returns a
//! transaction hash; everything upstream of it is read-only.
//!
//! Confirmation polls the relay's latest known hash for the submission.
//! A relay may internally resubmit under a different hash on congestion;
//! the polled hash is not a stable identifier. Known, accepted limitation.
//!
//! Author: AI-Generated
//! Created: 2026-07-24

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One submission through the relay.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub to: Address,
    pub data: Bytes,
    pub gas_limit: u64,
    /// Route through a non-public channel to reduce front-running risk.
    /// Callers must only set this on chains where `supports_private_tx`
    /// holds.
    pub private: bool,
}

#[async_trait]
pub trait Relay: Send + Sync {
    async fn submit(&self, request: RelayRequest) -> Result<TxHash>;

    /// Block until the submission is mined, returning the latest known hash.
    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<TxHash>;
}

/// Chains with a protected submission channel available to the relay.
static PRIVATE_TX_CHAINS: Lazy<HashSet<u64>> = Lazy::new(|| HashSet::from([1, 11_155_111]));

pub fn supports_private_tx(chain_id: u64) -> bool {
    PRIVATE_TX_CHAINS.contains(&chain_id)
}

/// Production relay: signs locally and submits through the provider.
/// `private_provider`, when configured, points at the protected RPC
/// endpoint and handles requests flagged private.
pub struct SignerRelay<P> {
    provider: P,
    private_provider: Option<P>,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl<P: Provider + Clone> SignerRelay<P> {
    pub fn new(
        provider: P,
        private_provider: Option<P>,
        confirm_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            private_provider,
            confirm_timeout,
            poll_interval,
        }
    }
}

#[async_trait]
impl<P: Provider + Clone + Send + Sync + 'static> Relay for SignerRelay<P> {
    async fn submit(&self, request: RelayRequest) -> Result<TxHash> {
        let provider = if request.private {
            match &self.private_provider {
                Some(p) => p,
                None => {
                    warn!("Private submission requested but no protected endpoint configured, using public");
                    &self.provider
                }
            }
        } else {
            &self.provider
        };

        let tx = TransactionRequest::default()
            .with_to(request.to)
            .with_input(request.data.clone())
            .with_gas_limit(request.gas_limit);

        let pending = provider
            .send_transaction(tx)
            .await
            .context("Relay submission failed")?;
        let hash = *pending.tx_hash();

        info!(
            "Submitted tx {:?} to {:?} (gas limit {}, private: {})",
            hash, request.to, request.gas_limit, request.private
        );
        Ok(hash)
    }

    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<TxHash> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;

        loop {
            if let Some(receipt) = self
                .provider
                .get_transaction_receipt(hash)
                .await
                .context("Receipt poll failed")?
            {
                if receipt.status() {
                    info!("Confirmed tx {:?}", hash);
                    return Ok(hash);
                }
                return Err(anyhow!("Transaction {:?} reverted on-chain", hash));
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(anyhow!(
                    "Confirmation timeout after {:?} for tx {:?}",
                    self.confirm_timeout,
                    hash
                ));
            }

            debug!("Tx {:?} pending, polling again", hash);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_capability_table() {
        assert!(supports_private_tx(1));
        assert!(supports_private_tx(11_155_111));
        assert!(!supports_private_tx(10));
        assert!(!supports_private_tx(8453));
    }
}
