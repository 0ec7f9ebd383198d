//! Chain-specific types and error definitions.

use alloy::primitives::Address;
use alloy::transports::TransportError;
use thiserror::Error;

// Re-export NodeConfig from config module to avoid duplication
pub use crate::config::schema::NodeConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Transport or RPC-level failure reported by the client, kept as-is.
    #[error("RPC error: {0}")]
    Transport(#[from] TransportError),

    /// RPC failure described by message only.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Local signing rejected the transaction.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Node rejected a signed transaction.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Signer callback was asked to sign for an account it does not hold.
    #[error("Signer for {expected} cannot sign for {actual}")]
    NotAuthorized { expected: Address, actual: Address },

    /// Address string did not parse.
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
