//! Bridge deposit smoke test.
//!
//! # Run Overview
//!
//! ```text
//!   ┌──────────────┐   anvil_setBalance    ┌────────────┐
//!   │  ephemeral   │ ────────────────────▶ │            │
//!   │   account    │   transfer (burn)     │    node    │
//!   │              │ ────────────────────▶ │  JSON-RPC  │
//!   └──────┬───────┘                       │            │
//!          │          poll code            │            │
//!          │  ◀──────────────────────────  │            │
//!          │   depositTransaction(...)     │            │
//!          │ ────────────────────────────▶ │   portal   │
//!          │          poll receipt         │            │
//!          ▼  ◀──────────────────────────  └────────────┘
//!   pretty-printed receipt
//! ```
//!
//! Exits non-zero on the first failing step.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use portal_deposit::blockchain::RpcNodeClient;
use portal_deposit::config::LogFormat;
use portal_deposit::lifecycle::startup::{resolve_config, Overrides};
use portal_deposit::observability::init_logging;
use portal_deposit::flow::write_report;
use portal_deposit::{DepositFlow, Shutdown};

#[derive(Parser)]
#[command(name = "portal-deposit")]
#[command(about = "Fund an account and push a deposit through a bridge portal", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used without it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node JSON-RPC URL.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Bridge portal contract address.
    #[arg(long)]
    portal: Option<String>,

    /// Give up any single wait after this many seconds.
    #[arg(long)]
    poll_deadline_secs: Option<u64>,

    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(
        cli.config.as_deref(),
        Overrides {
            rpc_url: cli.rpc_url,
            portal_address: cli.portal,
            poll_deadline_secs: cli.poll_deadline_secs,
            log_format: cli.log_format,
        },
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        rpc_url = %config.node.rpc_url,
        portal = %config.bridge.portal_address,
        "portal-deposit v0.1.0 starting"
    );

    let client = match RpcNodeClient::new(config.node.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create node client");
            return ExitCode::FAILURE;
        }
    };

    // Validation guarantees a deadline
    let Some(policy) = config.polling.policy() else {
        tracing::error!("polling.deadline_secs must be set");
        return ExitCode::FAILURE;
    };

    let shutdown = Shutdown::new();
    let signals = shutdown.listen_for_signals();

    let result = DepositFlow::new(&client, &config, policy, shutdown.token())
        .run()
        .await;
    signals.abort();

    match result {
        Ok(outcome) => {
            tracing::info!(
                account = %outcome.account,
                deposit_tx = %outcome.deposit_hash,
                "Deposit confirmed"
            );
            if let Err(e) = write_report(&mut std::io::stdout().lock(), &outcome.rendered_receipt) {
                tracing::error!(error = %e, "Failed to print deposit receipt");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Deposit run aborted");
            ExitCode::FAILURE
        }
    }
}
