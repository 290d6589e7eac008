//! Configuration management
//!
//! Runtime settings come from chain-specific `.env.<chain>` files; the
//! per-chain contract address book comes from `config/<chain>.toml`.
//! Both are supplied by the operator; maintaining the address book itself
//! is out of scope for the bots.
//!
//! Author: AI-Generated
//! Created: 2026-07-21
//! Modified: 2026-07-29 - TOML address book split out of env settings

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Runtime settings shared by all three bots.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub chain_name: String,
    pub chain_id: u64,
    pub rpc_url: String,

    /// Relayer signing key (hex). The relayer address is derived from it.
    pub relayer_key: String,

    /// Receives swapped-out tokens, claim fees, and auction rewards.
    pub recipient: Address,

    pub min_profit_usd: f64,

    /// Fraction of max obtainable output to target on swaps: wanted = max / divisor.
    pub swap_divisor: u64,

    /// Operator opt-in to private submission. Only honored on chains that
    /// support it (see relay::supports_private_tx).
    pub use_private_tx: bool,

    /// Protected RPC endpoint for private submissions, when the chain has one.
    pub private_rpc_url: Option<String>,

    pub subgraph_url: String,

    pub confirm_timeout_secs: u64,
    pub confirm_poll_secs: u64,

    /// Evaluate and log the decision but never submit. Set from the CLI.
    pub dry_run: bool,
}

/// Per-chain contract address book, loaded from `config/<chain>.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressBook {
    pub market_rate_feed: Address,
    pub wrapped_native: Address,
    pub liquidation_router: Address,
    pub prize_pool: Address,
    pub claimer: Address,
    pub rng_auction: Address,
    pub draw_auction: Address,
}

impl AddressBook {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read address book {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse address book {}", path.display()))
    }
}

/// Load settings from the chain-specific env file (e.g. `.env.optimism`),
/// falling back to already-exported environment variables.
pub fn load_settings(chain: &str) -> Result<BotSettings> {
    let env_file = format!(".env.{}", chain);
    dotenv::from_filename(&env_file).ok();
    dotenv::dotenv().ok();

    let settings = BotSettings {
        chain_name: chain.to_string(),
        chain_id: env_var("CHAIN_ID")?.parse().context("CHAIN_ID not a u64")?,
        rpc_url: env_var("RPC_URL")?,
        relayer_key: env_var("RELAYER_PRIVATE_KEY")?,
        recipient: env_var("RECIPIENT")?
            .parse()
            .context("RECIPIENT not a valid address")?,
        min_profit_usd: env_var("MIN_PROFIT_USD")?
            .parse()
            .context("MIN_PROFIT_USD not a number")?,
        swap_divisor: env_or("SWAP_DIVISOR", "2")
            .parse()
            .context("SWAP_DIVISOR not a u64")?,
        use_private_tx: env_or("PRIVATE_TX", "false")
            .parse()
            .context("PRIVATE_TX not a bool")?,
        private_rpc_url: std::env::var("PRIVATE_RPC_URL").ok(),
        subgraph_url: env_var("SUBGRAPH_URL")?,
        confirm_timeout_secs: env_or("CONFIRM_TIMEOUT_SECS", "180")
            .parse()
            .context("CONFIRM_TIMEOUT_SECS not a u64")?,
        confirm_poll_secs: env_or("CONFIRM_POLL_SECS", "3")
            .parse()
            .context("CONFIRM_POLL_SECS not a u64")?,
        dry_run: false,
    };

    if settings.swap_divisor == 0 {
        bail!("SWAP_DIVISOR must be at least 1");
    }
    if settings.min_profit_usd < 0.0 {
        bail!("MIN_PROFIT_USD must not be negative");
    }

    Ok(settings)
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{} not set", name))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
