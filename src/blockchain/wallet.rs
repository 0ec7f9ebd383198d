//! Ephemeral account management and transaction signing.
//!
//! # Security
//! - Keys are generated per run and never persisted
//! - Keys are never logged or serialized

use std::sync::Arc;

use alloy::consensus::{SignableTransaction, TxLegacy};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::transaction::{SignedTransaction, SignerFn, TxRequest};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// Keypair plus derived address, used to sign every transaction of a run.
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    /// Generate a fresh random account.
    pub fn generate() -> Self {
        let signer = PrivateKeySigner::random();
        tracing::info!(address = %signer.address(), "Generated ephemeral account");
        Self { signer }
    }

    /// Create an account from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Signing(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer })
    }

    /// Get the account's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign `request` as an EIP-155 legacy transaction bound to `chain_id`.
    ///
    /// Signing is deterministic (RFC 6979), so the same request and chain
    /// always produce the same transaction hash.
    pub fn sign(&self, request: &TxRequest, chain_id: ChainId) -> BlockchainResult<SignedTransaction> {
        if chain_id.0 == 0 {
            return Err(BlockchainError::Signing(
                "chain id must be non-zero for replay-protected signing".to_string(),
            ));
        }

        let tx: TxLegacy = request.to_legacy(chain_id);
        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        Ok(SignedTransaction::new(tx.into_signed(signature)))
    }

    /// Signer callback for contract bindings.
    ///
    /// The callback refuses to sign for any sender other than this account.
    pub fn signer_fn(&self, chain_id: ChainId) -> SignerFn {
        let account = self.clone();
        Arc::new(move |from: Address, request: &TxRequest| {
            if from != account.address() {
                return Err(BlockchainError::NotAuthorized {
                    expected: account.address(),
                    actual: from,
                });
            }
            account.sign(request, chain_id)
        })
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn transfer() -> TxRequest {
        TxRequest::transfer(0, Some(Address::ZERO), U256::from(10u64.pow(16)), 21_000, 1_000_000_000)
    }

    #[test]
    fn test_account_from_private_key() {
        let account = Account::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            account.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let prefixed = Account::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(prefixed.address(), account.address());
    }

    #[test]
    fn test_invalid_private_key() {
        let err = Account::from_private_key("invalid_key").unwrap_err();
        assert!(err.to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_generated_accounts_differ() {
        assert_ne!(Account::generate().address(), Account::generate().address());
    }

    #[test]
    fn test_sign_recovers_sender() {
        let account = Account::generate();
        let recipients = [None, Some(Address::ZERO), Some(Address::repeat_byte(0xee))];
        let values = [U256::ZERO, U256::from(10u64.pow(16)), U256::MAX];
        let gas = [(21_000u64, 1u128), (1_000_000, 1_000_000_000), (30_000_000, u64::MAX as u128)];
        let inputs: [&[u8]; 2] = [&[], &[0xe9, 0xe0, 0x5c, 0x42, 0x00, 0xff]];

        let mut nonces = [0u64, 1, 7, u32::MAX as u64].into_iter().cycle();
        for to in recipients {
            for value in values {
                for (gas_limit, gas_price) in gas {
                    for input in inputs {
                        let nonce = nonces.next().unwrap();
                        let request = TxRequest::transfer(nonce, to, value, gas_limit, gas_price)
                            .with_input(input.to_vec());
                        let signed = account.sign(&request, ChainId(31337)).unwrap();
                        assert_eq!(
                            signed.recover_sender().unwrap(),
                            account.address(),
                            "{:?}",
                            request
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let account = Account::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let a = account.sign(&transfer(), ChainId(1)).unwrap();
        let b = account.sign(&transfer(), ChainId(1)).unwrap();
        assert_eq!(a.hash(), b.hash());

        let other_chain = account.sign(&transfer(), ChainId(10)).unwrap();
        assert_ne!(a.hash(), other_chain.hash());
        assert_eq!(other_chain.chain_id(), Some(10));
    }

    #[test]
    fn test_zero_chain_id_is_signing_error() {
        let account = Account::generate();
        let err = account.sign(&transfer(), ChainId(0)).unwrap_err();
        assert!(matches!(err, BlockchainError::Signing(_)));
    }

    #[test]
    fn test_signer_fn_rejects_foreign_sender() {
        let account = Account::generate();
        let signer = account.signer_fn(ChainId(1));

        assert!(signer(account.address(), &transfer()).is_ok());

        let err = signer(Address::repeat_byte(0x11), &transfer()).unwrap_err();
        assert!(matches!(err, BlockchainError::NotAuthorized { .. }));
    }
}
