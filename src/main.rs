//! Prize Vault Keeper Bots
//!
//! Main entry point. One invocation runs exactly one evaluation cycle for
//! the selected bot and exits; an external scheduler re-invokes it. Fatal
//! cycle errors exit nonzero so the next scheduled run retries from a
//! clean snapshot.
//!
//! Architecture:
//! - Loads `.env.<chain>` settings and the `config/<chain>.toml` address book
//! - Two HTTP providers: read-only for the pipeline, wallet-backed for the relay
//! - Pipeline per opportunity: snapshot → parameters → funds → gas → decide
//! - Executor submits through the relay, privately where the chain supports it
//!
//! Author: AI-Generated
//! Created: 2026-07-21
//! Modified: 2026-08-03 - single-cycle invocations, scheduler owns the cadence

use anyhow::{Context, Result};
use clap::Parser;
use prizebot::bots::{self, BotContext};
use prizebot::config::{load_settings, AddressBook};
use prizebot::discovery::SubgraphDiscovery;
use prizebot::executor::TransactionExecutor;
use prizebot::oracle::PriceOracle;
use prizebot::pipeline::{ContextAggregator, GasEstimator, ParameterCalculator};
use prizebot::relay::SignerRelay;
use prizebot::types::BotKind;
use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Prize Vault Keeper Bots — Multi-Chain (Optimism, Base)
#[derive(Parser)]
#[command(name = "prizebot")]
struct Args {
    /// Which keeper bot to run for this cycle
    #[arg(short, long, env = "BOT", value_enum)]
    bot: BotKind,

    /// Chain to run on (optimism, base)
    #[arg(short, long, env = "CHAIN", default_value = "optimism")]
    chain: String,

    /// Evaluate and log the decision but never submit
    #[arg(long)]
    dry_run: bool,

    /// Directory holding the per-chain address books
    #[arg(long, default_value = "config")]
    config_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let chain = args.chain.to_lowercase();
    match chain.as_str() {
        "optimism" | "base" => {}
        _ => anyhow::bail!("Unsupported chain: '{}'. Supported: optimism, base", chain),
    }

    info!("Prize vault keeper starting — bot: {}, chain: {}", args.bot, chain);

    let mut settings = load_settings(&chain)?;
    settings.dry_run = args.dry_run;
    info!(
        "Configuration loaded (chain_id: {}, min profit ${:.2}, divisor {}, dry run: {})",
        settings.chain_id, settings.min_profit_usd, settings.swap_divisor, settings.dry_run
    );

    let book = AddressBook::load(format!("{}/{}.toml", args.config_dir, chain))?;

    let signer: PrivateKeySigner = settings
        .relayer_key
        .parse()
        .context("RELAYER_PRIVATE_KEY is not a valid key")?;
    let account = signer.address();
    info!("Relayer account: {:?}", account);

    // Read-only provider for the pipeline, wallet-backed provider for the relay
    let rpc_url = settings.rpc_url.parse().context("Invalid RPC URL")?;
    let provider: DynProvider = ProviderBuilder::new().connect_http(rpc_url).erased();

    let rpc_url = settings.rpc_url.parse().context("Invalid RPC URL")?;
    let wallet_provider: DynProvider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(rpc_url)
        .erased();

    let private_provider: Option<DynProvider> = match &settings.private_rpc_url {
        Some(url) => {
            let url = url.parse().context("Invalid private RPC URL")?;
            let signer: PrivateKeySigner = settings
                .relayer_key
                .parse()
                .context("RELAYER_PRIVATE_KEY is not a valid key")?;
            Some(
                ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased(),
            )
        }
        None => None,
    };

    // Verify connection before doing anything else
    let block = provider.get_block_number().await?;
    info!("Connected to {} at block {}", settings.chain_name, block);

    let relay = SignerRelay::new(
        wallet_provider,
        private_provider,
        Duration::from_secs(settings.confirm_timeout_secs),
        Duration::from_secs(settings.confirm_poll_secs),
    );

    let ctx = BotContext {
        oracle: PriceOracle::new(provider.clone(), book.market_rate_feed, book.wrapped_native),
        aggregator: ContextAggregator::new(provider.clone(), book.clone(), account),
        calculator: ParameterCalculator::new(provider.clone()),
        gas: GasEstimator::new(provider.clone()),
        executor: TransactionExecutor::new(relay, book.clone(), settings.use_private_tx, settings.chain_id),
        discovery: SubgraphDiscovery::new(settings.subgraph_url.clone()),
        account,
        settings,
        book,
    };

    let result = match args.bot {
        BotKind::Liquidator => bots::liquidator::run_cycle(&ctx).await,
        BotKind::Claimer => bots::claimer::run_cycle(&ctx).await,
        BotKind::Drawkeeper => bots::draw::run_cycle(&ctx).await,
    };

    match result {
        Ok(summary) => {
            bots::log_summary(&summary);
            Ok(())
        }
        Err(e) => {
            error!("Cycle aborted: {:#}", e);
            std::process::exit(1);
        }
    }
}
