//! Transaction building, signing envelopes and broadcast.
//!
//! # Responsibilities
//! - Describe a transaction before signing ([`TxRequest`])
//! - Hold a signed, hash-identified transaction ([`SignedTransaction`])
//! - Broadcast it once and only once ([`broadcast`])

use std::sync::Arc;

use alloy::consensus::{Signed, TxEnvelope, TxLegacy};
use alloy::eips::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// Gas used by a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// Callback that signs a request on behalf of `from`.
pub type SignerFn = Arc<dyn Fn(Address, &TxRequest) -> BlockchainResult<SignedTransaction> + Send + Sync>;

/// Unsigned transaction intent.
///
/// The nonce must be read from the node right before construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub nonce: u64,
    /// `None` creates a contract.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub input: Bytes,
}

impl TxRequest {
    /// Value transfer with no call data.
    pub fn transfer(
        nonce: u64,
        to: Option<Address>,
        value: U256,
        gas_limit: u64,
        gas_price: u128,
    ) -> Self {
        Self {
            nonce,
            to,
            value,
            gas_limit,
            gas_price,
            input: Bytes::new(),
        }
    }

    /// Attach call data.
    pub fn with_input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }

    /// Legacy envelope with EIP-155 replay protection for `chain_id`.
    pub fn to_legacy(&self, chain_id: ChainId) -> TxLegacy {
        TxLegacy {
            chain_id: Some(chain_id.0),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to.map(TxKind::Call).unwrap_or(TxKind::Create),
            value: self.value,
            input: self.input.clone(),
        }
    }
}

/// A request bound to a signature under one chain id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    inner: Signed<TxLegacy>,
}

impl SignedTransaction {
    pub(crate) fn new(inner: Signed<TxLegacy>) -> Self {
        Self { inner }
    }

    /// Transaction hash.
    pub fn hash(&self) -> TxHash {
        *self.inner.hash()
    }

    /// Chain id the signature is bound to.
    pub fn chain_id(&self) -> Option<u64> {
        self.inner.tx().chain_id
    }

    /// Recover the signing address from the signature.
    pub fn recover_sender(&self) -> BlockchainResult<Address> {
        use alloy::consensus::SignableTransaction;

        self.inner
            .signature()
            .recover_address_from_prehash(&self.inner.tx().signature_hash())
            .map_err(|e| BlockchainError::Signing(format!("Signature recovery failed: {}", e)))
    }

    /// EIP-2718 bytes for `eth_sendRawTransaction`.
    pub fn encoded(&self) -> Vec<u8> {
        TxEnvelope::from(self.inner.clone()).encoded_2718()
    }
}

/// A signed transaction the node has accepted.
#[derive(Debug, Clone)]
pub struct SubmittedTransaction {
    tx: SignedTransaction,
}

impl SubmittedTransaction {
    /// Transaction hash.
    pub fn hash(&self) -> TxHash {
        self.tx.hash()
    }
}

/// Broadcast a signed transaction.
///
/// Takes the transaction by value so it cannot be submitted twice.
pub async fn broadcast<N>(client: &N, tx: SignedTransaction) -> BlockchainResult<SubmittedTransaction>
where
    N: NodeClient + ?Sized,
{
    let node_hash = client
        .send_raw_transaction(&tx.encoded())
        .await
        .map_err(|e| BlockchainError::Submission(e.to_string()))?;

    if node_hash != tx.hash() {
        tracing::warn!(
            local = %tx.hash(),
            node = %node_hash,
            "Node reported a different transaction hash"
        );
    }

    Ok(SubmittedTransaction { tx })
}
