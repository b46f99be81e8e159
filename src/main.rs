//! Transfer Bot CLI
//!
//! Command-line interface for running randomized transfers from a wallet pool.

use alloy::primitives::U256;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use transfer_bot::config::{load_private_keys, Config, RpcConfig};
use transfer_bot::ledger::verify_chain_id;
use transfer_bot::units::{shorten_address, to_intermediate_unit};
use transfer_bot::{
    prompt, IssuerSettings, ParameterGenerator, Result, RetryPolicy, RpcLedger,
    TransactionIssuer, WalletManager,
};

#[derive(Parser)]
#[command(name = "transfer-bot")]
#[command(about = "Randomized low-value transfers from a pool of wallets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue transfers from every configured wallet
    Run {
        /// JSON file with an array of hex private keys (overrides config)
        #[arg(short, long)]
        keys: Option<PathBuf>,

        /// Transactions per wallet (prompted for when omitted)
        #[arg(short = 'n', long)]
        transactions_per_wallet: Option<u64>,

        /// Seconds between transactions (prompted for when omitted)
        #[arg(short, long)]
        wait_seconds: Option<u64>,

        /// Seed for reproducible amounts, gas prices and recipients
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the transfer report
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config
    let config = match cli.config {
        Some(config_path) => Config::load(&config_path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Run {
            keys,
            transactions_per_wallet,
            wait_seconds,
            seed,
        } => {
            run_transfers(config, keys, transactions_per_wallet, wait_seconds, seed).await?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn print_header() {
    println!("******************************************************");
    println!("  transfer-bot: randomized wallet traffic");
    println!("******************************************************");
}

async fn run_transfers(
    config: Config,
    keys_path: Option<PathBuf>,
    transactions_per_wallet: Option<u64>,
    wait_seconds: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    print_header();

    let keys_path = keys_path.unwrap_or_else(|| PathBuf::from(&config.keys_path));
    let private_keys = load_private_keys(&keys_path)?;

    let rpc_config = RpcConfig::resolve(config.rpc_url.as_deref());
    let ledger = Arc::new(RpcLedger::connect(rpc_config.url())?);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            interrupt.cancel();
        }
    });

    let retry = RetryPolicy::from_settings(&config.retry).with_cancellation(cancel.clone());

    tracing::info!(
        rpc_host = ledger.url().host_str().unwrap_or("unknown"),
        chain_id = config.chain_id,
        wallets = private_keys.len(),
        "Connecting to ledger"
    );
    verify_chain_id(ledger.as_ref(), &retry, config.chain_id).await?;

    let plan = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        prompt::read_run_plan(&mut input, &mut output, transactions_per_wallet, wait_seconds)?
    };

    let wallets = WalletManager::new(
        ledger.clone(),
        retry.clone(),
        config.chain_id,
        config.transfer.gas_limit,
    );
    let identities = wallets.create_identities(&private_keys).await?;
    drop(private_keys);

    for identity in &identities {
        println!(
            "Wallet {} will perform {} transactions",
            shorten_address(&identity.address_string()),
            plan.transactions_per_wallet
        );
        tracing::info!(
            address = %identity.address(),
            nonce = identity.current_nonce(),
            suggested_gas_price_gwei = %to_intermediate_unit(U256::from(identity.last_known_gas_price())),
            "Wallet ready"
        );
    }

    let params = match seed {
        Some(seed) => ParameterGenerator::seeded(seed),
        None => ParameterGenerator::from_entropy(),
    };

    let mut issuer = TransactionIssuer::new(
        ledger,
        wallets,
        identities,
        params,
        retry,
        IssuerSettings::from_config(&config)?,
    )
    .with_cancellation(cancel);

    let summary = issuer.run(&plan).await;

    println!(
        "Done: {} attempted, {} sent, {} skipped{}",
        summary.attempted,
        summary.sent(),
        summary.skipped(),
        if summary.cancelled { " (interrupted)" } else { "" }
    );

    Ok(())
}
