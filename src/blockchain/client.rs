//! Node RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the node's JSON-RPC endpoint
//! - Query chain state (gas price, chain id, nonce, code, receipts)
//! - Broadcast signed transactions
//! - Seed balances through the node's admin namespace
//!
//! No call is retried here. Retry policy belongs to the pollers.

use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, NodeConfig};

/// Admin method used to set an account balance directly.
pub const SET_BALANCE_METHOD: &str = "anvil_setBalance";

/// Operations the deposit flow needs from a node.
///
/// Every call propagates the underlying failure unchanged. Dropping the
/// returned future cancels the call.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Issue a raw JSON-RPC call with positional params.
    async fn call(&self, method: &str, params: Value) -> BlockchainResult<Value>;

    /// Current suggested gas price in wei.
    async fn gas_price(&self) -> BlockchainResult<u128>;

    /// Chain identifier reported by the node.
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    /// Transaction count (nonce) of `address` at the latest block.
    async fn nonce_at(&self, address: Address) -> BlockchainResult<u64>;

    /// Deployed code at `address`. Empty when nothing is deployed.
    async fn code_at(&self, address: Address) -> BlockchainResult<Bytes>;

    /// Receipt for `tx_hash`, or `None` while the transaction is unmined.
    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>>;

    /// Broadcast an EIP-2718 encoded signed transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash>;

    /// Set the balance of `address` via the admin namespace.
    ///
    /// Fixture-only capability; failures are returned, never retried.
    async fn set_balance(&self, address: Address, balance: U256) -> BlockchainResult<()> {
        self.call(SET_BALANCE_METHOD, json!([address, balance]))
            .await
            .map(|_| ())
            .map_err(|e| BlockchainError::Rpc(format!("{}, {}: {}", address, balance, e)))
    }
}

/// HTTP JSON-RPC client backed by an alloy provider.
#[derive(Clone)]
pub struct RpcNodeClient {
    provider: RootProvider,
    config: NodeConfig,
    timeout_duration: Duration,
}

impl RpcNodeClient {
    /// Create a client for the configured endpoint.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: NodeConfig) -> BlockchainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        tracing::debug!(rpc_url = %config.rpc_url, "Node client initialized");

        Ok(Self {
            provider: RootProvider::new_http(url),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    async fn timed<F, T>(&self, fut: F) -> BlockchainResult<T>
    where
        F: std::future::IntoFuture<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(result) => result.map_err(BlockchainError::from),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }
}

#[async_trait]
impl NodeClient for RpcNodeClient {
    async fn call(&self, method: &str, params: Value) -> BlockchainResult<Value> {
        self.timed(
            self.provider
                .raw_request::<Value, Value>(method.to_string().into(), params),
        )
        .await
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.timed(self.provider.get_gas_price()).await
    }

    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.timed(self.provider.get_chain_id()).await.map(ChainId)
    }

    async fn nonce_at(&self, address: Address) -> BlockchainResult<u64> {
        self.timed(self.provider.get_transaction_count(address)).await
    }

    async fn code_at(&self, address: Address) -> BlockchainResult<Bytes> {
        self.timed(self.provider.get_code_at(address)).await
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.timed(self.provider.get_transaction_receipt(tx_hash)).await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let pending = self.timed(self.provider.send_raw_transaction(raw)).await?;
        Ok(*pending.tx_hash())
    }
}

impl std::fmt::Debug for RpcNodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNodeClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> NodeConfig {
        NodeConfig {
            // Nothing listens on the discard port
            rpc_url: "http://127.0.0.1:9".to_string(),
            rpc_timeout_secs: 2,
        }
    }

    #[test]
    fn test_client_creation_is_lazy() {
        let client = RpcNodeClient::new(test_config()).unwrap();
        assert_eq!(client.config().rpc_timeout_secs, 2);
        assert!(format!("{:?}", client).contains("127.0.0.1:9"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = RpcNodeClient::new(config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_unreachable_node_propagates_error() {
        let client = RpcNodeClient::new(test_config()).unwrap();
        assert!(client.chain_id().await.is_err());
        assert!(client.set_balance(Address::ZERO, U256::from(1)).await.is_err());
    }
}
