//! Polling for eventually-true chain conditions.
//!
//! # Responsibilities
//! - Wait for contract code to appear at an address
//! - Wait for a transaction receipt to become available
//!
//! # Behaviour
//! A failed query and a "not yet" answer are treated the same: sleep one
//! interval and ask again. Every attempt and every sleep races the
//! cancellation token, and the wait gives up once the deadline has passed.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionReceipt;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::blockchain::client::NodeClient;

/// Interval and deadline for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between unsuccessful attempts.
    pub interval: Duration,
    /// Give up once this much time has passed since the first attempt.
    pub deadline: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }
}

/// Why a wait ended without its condition being met.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("gave up waiting for [{label}] after {waited:?}")]
    DeadlineExceeded { label: String, waited: Duration },

    #[error("stopped waiting for [{label}]: cancelled")]
    Cancelled { label: String },
}

/// Block until code is observed at `address`.
pub async fn wait_for_contract<N>(
    client: &N,
    address: Address,
    label: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<(), PollError>
where
    N: NodeClient + ?Sized,
{
    poll_until(
        Waiting {
            kind: "contract",
            label,
            pending: "to be deployed",
        },
        policy,
        cancel,
        || async move {
            match client.code_at(address).await {
                Ok(code) if !code.is_empty() => Some(()),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(%address, error = %e, "code query failed");
                    None
                }
            }
        },
    )
    .await
}

/// Block until a receipt for `tx_hash` is available, then return it.
pub async fn wait_for_receipt<N>(
    client: &N,
    tx_hash: TxHash,
    label: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<TransactionReceipt, PollError>
where
    N: NodeClient + ?Sized,
{
    poll_until(
        Waiting {
            kind: "receipt",
            label,
            pending: "to be mined",
        },
        policy,
        cancel,
        || async move {
            match client.transaction_receipt(tx_hash).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    tracing::debug!(%tx_hash, error = %e, "receipt query failed");
                    None
                }
            }
        },
    )
    .await
}

struct Waiting<'a> {
    kind: &'static str,
    label: &'a str,
    pending: &'static str,
}

async fn poll_until<T, F, Fut>(
    waiting: Waiting<'_>,
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let Waiting { kind, label, pending } = waiting;
    let cancelled = || PollError::Cancelled {
        label: label.to_string(),
    };
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            outcome = check() => outcome,
        };

        if let Some(value) = outcome {
            tracing::info!(attempt, "found {} [{}]", kind, label);
            return Ok(value);
        }

        let waited = start.elapsed();
        if waited >= policy.deadline {
            tracing::warn!(attempt, ?waited, "gave up on {} [{}]", kind, label);
            return Err(PollError::DeadlineExceeded {
                label: label.to_string(),
                waited,
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            _ = sleep(policy.interval) => {}
        }

        tracing::info!(attempt, "waiting for {} [{}] {}", kind, label, pending);
    }
}
