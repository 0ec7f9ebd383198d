//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::consensus::TxEnvelope;
use alloy::eips::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use serde_json::{json, Value};

use portal_deposit::blockchain::client::SET_BALANCE_METHOD;
use portal_deposit::blockchain::{BlockchainError, BlockchainResult, ChainId, NodeClient};

/// How the mock node should behave.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Script {
    pub chain_id: u64,
    pub gas_price: u128,
    pub fail_set_balance: bool,
    pub fail_gas_price: bool,
    pub fail_chain_id: bool,
    /// Never answer the gas price query.
    pub hang_gas_price: bool,
    /// Code queries answered with a transport error before anything else.
    pub code_errors: u32,
    /// Code queries answered with empty code after the errors.
    pub empty_code_polls: u32,
    /// Never report code.
    pub never_deploy: bool,
    /// Receipt queries per hash answered with `None` before the receipt.
    pub pending_receipt_polls: u32,
    /// Reject the send with this index (0-based) and every later one.
    pub reject_sends_from: Option<usize>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            gas_price: 1_000_000_000,
            fail_set_balance: false,
            fail_gas_price: false,
            fail_chain_id: false,
            hang_gas_price: false,
            code_errors: 0,
            empty_code_polls: 0,
            never_deploy: false,
            pending_receipt_polls: 0,
            reject_sends_from: None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<(String, Value)>,
    balances: HashMap<Address, U256>,
    code_queries: u32,
    receipt_queries: HashMap<TxHash, u32>,
    sent: Vec<Vec<u8>>,
}

/// In-process node answering from a [`Script`].
#[derive(Debug)]
pub struct MockNode {
    script: Script,
    state: Mutex<State>,
}

#[allow(dead_code)]
impl MockNode {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            state: Mutex::new(State::default()),
        }
    }

    pub fn balance_of(&self, address: Address) -> Option<U256> {
        self.state.lock().unwrap().balances.get(&address).copied()
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn code_queries(&self) -> u32 {
        self.state.lock().unwrap().code_queries
    }

    pub fn receipt_queries(&self, tx_hash: TxHash) -> u32 {
        self.state
            .lock()
            .unwrap()
            .receipt_queries
            .get(&tx_hash)
            .copied()
            .unwrap_or(0)
    }

    /// Decoded transactions the node accepted, in order.
    pub fn sent(&self) -> Vec<TxEnvelope> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|raw| TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap())
            .collect()
    }

    fn accepted_hashes(&self) -> Vec<TxHash> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(keccak256)
            .collect()
    }
}

/// A successful legacy receipt for `tx_hash`.
pub fn receipt_for(tx_hash: TxHash) -> TransactionReceipt {
    serde_json::from_value(json!({
        "type": "0x0",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0xbb),
        "blockNumber": "0x1",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": Address::repeat_byte(0x01),
        "to": Address::ZERO,
        "contractAddress": null
    }))
    .unwrap()
}

#[async_trait]
impl NodeClient for MockNode {
    async fn call(&self, method: &str, params: Value) -> BlockchainResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((method.to_string(), params.clone()));

        if method != SET_BALANCE_METHOD {
            return Err(BlockchainError::Rpc(format!("method {} not found", method)));
        }
        if self.script.fail_set_balance {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }

        let address: Address = serde_json::from_value(params[0].clone())
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
        let balance: U256 = serde_json::from_value(params[1].clone())
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
        state.balances.insert(address, balance);
        Ok(Value::Null)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        if self.script.hang_gas_price {
            std::future::pending::<()>().await;
        }
        if self.script.fail_gas_price {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(self.script.gas_price)
    }

    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        if self.script.fail_chain_id {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(ChainId(self.script.chain_id))
    }

    async fn nonce_at(&self, _address: Address) -> BlockchainResult<u64> {
        Ok(self.state.lock().unwrap().sent.len() as u64)
    }

    async fn code_at(&self, _address: Address) -> BlockchainResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.code_queries += 1;
        let n = state.code_queries;

        if n <= self.script.code_errors {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        if self.script.never_deploy || n <= self.script.code_errors + self.script.empty_code_polls {
            return Ok(Bytes::new());
        }
        Ok(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]))
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        let known = self.accepted_hashes().contains(&tx_hash);
        let mut state = self.state.lock().unwrap();
        let polls = state.receipt_queries.entry(tx_hash).or_insert(0);
        *polls += 1;

        if known && *polls > self.script.pending_receipt_polls {
            Ok(Some(receipt_for(tx_hash)))
        } else {
            Ok(None)
        }
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let mut state = self.state.lock().unwrap();
        if let Some(from) = self.script.reject_sends_from {
            if state.sent.len() >= from {
                return Err(BlockchainError::Rpc("insufficient funds for gas * price + value".to_string()));
            }
        }
        state.sent.push(raw.to_vec());
        Ok(keccak256(raw))
    }
}
