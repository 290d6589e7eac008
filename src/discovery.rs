//! Opportunity discovery
//!
//! The pipeline treats discovery as a data source returning typed records:
//! liquidation pair addresses for the liquidator, eligible winners for the
//! claimer. The production implementation reads the protocol subgraph;
//! tests substitute fixed lists through the trait.
//!
//! Author: AI-Generated
//! Created: 2026-07-23

use crate::types::PrizeClaim;
use alloy::primitives::Address;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Discovery: Send + Sync {
    /// Liquidation pairs registered for this chain, in subgraph order.
    /// The cycle evaluates them in exactly this order.
    async fn liquidation_pairs(&self) -> Result<Vec<Address>>;

    /// Unclaimed eligible wins for the given draw.
    async fn claim_winners(&self, draw_id: u32) -> Result<Vec<PrizeClaim>>;
}

/// Subgraph-backed discovery (GraphQL over HTTP).
pub struct SubgraphDiscovery {
    client: reqwest::Client,
    url: String,
}

impl SubgraphDiscovery {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("reqwest client construction cannot fail with static config"),
            url: url.into(),
        }
    }

    async fn query<T: for<'de> Deserialize<'de>>(&self, body: serde_json::Value) -> Result<T> {
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("Subgraph request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("Subgraph returned HTTP {}", resp.status()));
        }

        let parsed: GraphQlResponse<T> =
            resp.json().await.context("Subgraph response decode failed")?;

        if let Some(errors) = parsed.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(anyhow!("Subgraph query errors: {}", messages.join("; ")));
        }

        parsed.data.ok_or_else(|| anyhow!("Subgraph response missing data"))
    }
}

#[async_trait]
impl Discovery for SubgraphDiscovery {
    async fn liquidation_pairs(&self) -> Result<Vec<Address>> {
        let body = serde_json::json!({
            "query": "{ liquidationPairs(orderBy: id) { id } }"
        });
        let data: PairsData = self.query(body).await?;

        let mut pairs = Vec::with_capacity(data.liquidation_pairs.len());
        for entity in data.liquidation_pairs {
            let address = entity
                .id
                .parse()
                .with_context(|| format!("Invalid pair address from subgraph: {}", entity.id))?;
            pairs.push(address);
        }
        debug!("Discovered {} liquidation pairs", pairs.len());
        Ok(pairs)
    }

    async fn claim_winners(&self, draw_id: u32) -> Result<Vec<PrizeClaim>> {
        let body = serde_json::json!({
            "query": "query Wins($draw: Int!) { prizeWins(where: { draw: $draw, claimed: false }) { vault winner tier prizeIndex } }",
            "variables": { "draw": draw_id }
        });
        let data: WinsData = self.query(body).await?;

        let mut claims = Vec::with_capacity(data.prize_wins.len());
        for win in data.prize_wins {
            claims.push(PrizeClaim {
                vault: win
                    .vault
                    .parse()
                    .with_context(|| format!("Invalid vault address: {}", win.vault))?,
                winner: win
                    .winner
                    .parse()
                    .with_context(|| format!("Invalid winner address: {}", win.winner))?,
                tier: win.tier,
                prize_index: win.prize_index,
            });
        }
        debug!("Discovered {} unclaimed wins for draw {}", claims.len(), draw_id);
        Ok(claims)
    }
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct PairsData {
    #[serde(rename = "liquidationPairs")]
    liquidation_pairs: Vec<PairEntity>,
}

#[derive(Deserialize)]
struct PairEntity {
    id: String,
}

#[derive(Deserialize)]
struct WinsData {
    #[serde(rename = "prizeWins")]
    prize_wins: Vec<WinEntity>,
}

#[derive(Deserialize)]
struct WinEntity {
    vault: String,
    winner: String,
    tier: u8,
    #[serde(rename = "prizeIndex")]
    prize_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wins_payload_decodes() {
        let raw = r#"{
            "data": {
                "prizeWins": [
                    {
                        "vault": "0x1111111111111111111111111111111111111111",
                        "winner": "0x2222222222222222222222222222222222222222",
                        "tier": 1,
                        "prizeIndex": 3
                    }
                ]
            }
        }"#;
        let parsed: GraphQlResponse<WinsData> = serde_json::from_str(raw).unwrap();
        let data = parsed.data.unwrap();
        assert_eq!(data.prize_wins.len(), 1);
        assert_eq!(data.prize_wins[0].tier, 1);
        assert_eq!(data.prize_wins[0].prize_index, 3);
    }

    #[test]
    fn test_graphql_errors_decode() {
        let raw = r#"{ "errors": [ { "message": "indexing error" } ] }"#;
        let parsed: GraphQlResponse<WinsData> = serde_json::from_str(raw).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.unwrap()[0].message, "indexing error");
    }
}
