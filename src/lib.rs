//! Bridge deposit smoke-test library.
//!
//! Funds an ephemeral account on a development node, sends a plain
//! transfer, waits for the bridge portal to be deployed, submits a deposit
//! through it and waits for the receipt.

pub mod blockchain;
pub mod config;
pub mod flow;
pub mod lifecycle;
pub mod observability;

pub use config::DepositConfig;
pub use flow::{DepositFlow, DepositOutcome, FlowError};
pub use lifecycle::Shutdown;
