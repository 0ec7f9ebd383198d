//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! wallet.rs       (ephemeral key, EIP-155 signing)
//!     → transaction.rs (request → signed → submitted)
//!     → client.rs      (JSON-RPC node calls with timeouts)
//!     → portal.rs      (bridge deposit call encoding)
//!     → poller.rs      (wait for code / receipts)
//! ```
//!
//! # Security Constraints
//! - Keys are generated per run and never logged
//! - Every RPC call has a configurable timeout

pub mod client;
pub mod poller;
pub mod portal;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{NodeClient, RpcNodeClient};
pub use poller::{wait_for_contract, wait_for_receipt, PollError, PollPolicy};
pub use portal::{DepositArgs, PortalBinding, TransactOpts};
pub use transaction::{broadcast, SignedTransaction, SubmittedTransaction, TxRequest};
pub use types::{BlockchainError, BlockchainResult, ChainId};
pub use wallet::Account;
