//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a deposit run.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::blockchain::PollPolicy;

const ETHER: u128 = 1_000_000_000_000_000_000;

/// Root configuration for a deposit run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DepositConfig {
    /// Node endpoint settings.
    pub node: NodeConfig,

    /// Bridge portal contract.
    pub bridge: BridgeConfig,

    /// Account seeding and the plain transfer.
    pub funding: FundingConfig,

    /// The deposit call itself.
    pub deposit: DepositCallConfig,

    /// Wait behaviour for code and receipts.
    pub polling: PollingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Per-request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8888".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Bridge portal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Address of the deployed portal contract.
    pub portal_address: String,

    /// Name used in progress logs.
    pub label: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            portal_address: "0xEE915F299A6d1eFf68c6EA22E5f93cFD551936F3".to_string(),
            label: "OptimismPortal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FundingConfig {
    /// Balance written to the fresh account via the admin call.
    pub seed_balance_wei: U256,

    /// Value sent by the plain transfer.
    pub transfer_value_wei: U256,

    pub transfer_gas_limit: u64,

    /// Wait for the transfer's receipt before touching the portal.
    pub await_transfer_receipt: bool,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            seed_balance_wei: U256::from(10 * ETHER),
            transfer_value_wei: U256::from(ETHER / 100),
            transfer_gas_limit: crate::blockchain::transaction::TRANSFER_GAS,
            await_transfer_receipt: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DepositCallConfig {
    /// Native value attached to the deposit call.
    pub value_wei: U256,

    /// Value minted on the connected chain.
    pub mint_wei: U256,

    /// Gas limit of the deposit transaction itself.
    pub gas_limit: u64,

    /// Block gas limit of the connected chain; half of it is requested.
    pub l2_block_gas_limit: u64,

    pub is_creation: bool,
}

impl DepositCallConfig {
    /// Gas limit requested for the deposit on the connected chain.
    pub fn l2_gas_limit(&self) -> u64 {
        self.l2_block_gas_limit / 2
    }
}

impl Default for DepositCallConfig {
    fn default() -> Self {
        Self {
            value_wei: U256::from(ETHER),
            mint_wei: U256::from(ETHER / 2),
            gas_limit: 1_000_000,
            l2_block_gas_limit: 25_000_000,
            is_creation: false,
        }
    }
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Sleep between unsuccessful attempts in milliseconds.
    pub interval_ms: u64,

    /// Upper bound on a single wait in seconds. Has no default and must be set.
    pub deadline_secs: Option<u64>,
}

impl PollingConfig {
    /// Poll policy, or `None` while no deadline is configured.
    pub fn policy(&self) -> Option<PollPolicy> {
        self.deadline_secs.map(|secs| {
            PollPolicy::new(
                Duration::from_millis(self.interval_ms),
                Duration::from_secs(secs),
            )
        })
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            deadline_secs: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `[HH:MM:SS.mmm] message`
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
        }
    }
}
