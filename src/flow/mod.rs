//! Deposit flow orchestration.
//!
//! # Sequence
//! ```text
//! generate account
//!     → seed balance (admin RPC)
//!     → gas price + chain id          ──▶ FlowContext
//!     → sign + broadcast transfer
//!     → [wait for transfer receipt]
//!     → wait for portal code
//!     → bind portal, read nonce, submit deposit
//!     → wait for deposit receipt
//!     → report
//! ```
//!
//! Every step returns a [`FlowError`] on failure and the flow stops there.
//! Nothing is rolled back and no submission is retried; deciding to exit
//! the process is left to the caller.
//!
//! Steps that are not polls race the cancellation token. A token that is
//! already cancelled stops the run before the step starts, so nothing is
//! signed or broadcast after a shutdown signal.

mod context;
mod report;

pub use context::FlowContext;
pub use report::{render_receipt, write_report};

use std::future::Future;

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionReceipt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::blockchain::{
    broadcast, wait_for_contract, wait_for_receipt, Account, BlockchainError, DepositArgs,
    NodeClient, PollError, PollPolicy, PortalBinding, TransactOpts, TxRequest,
};
use crate::config::DepositConfig;

/// Fatal outcome of one step.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("funding account failed: {0}")]
    Funding(#[source] BlockchainError),

    #[error("reading gas price / chain id failed: {0}")]
    ChainQuery(#[source] BlockchainError),

    #[error("signing transfer failed: {0}")]
    Signing(#[source] BlockchainError),

    #[error("sending transfer failed: {0}")]
    Transfer(#[source] BlockchainError),

    #[error("bridge not ready: {0}")]
    BridgeReadiness(#[source] PollError),

    #[error("binding portal failed: {0}")]
    Binding(#[source] BlockchainError),

    #[error("reading nonce failed: {0}")]
    Nonce(#[source] BlockchainError),

    #[error("error submitting deposit tx: {0}")]
    Deposit(#[source] BlockchainError),

    #[error("confirmation failed: {0}")]
    Confirmation(#[source] PollError),

    #[error("error marshalling receipt: {0}")]
    Report(#[source] serde_json::Error),

    #[error("run cancelled during {step}")]
    Cancelled { step: &'static str },
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct DepositOutcome {
    pub account: Address,
    pub transfer_hash: TxHash,
    pub deposit_hash: TxHash,
    pub receipt: TransactionReceipt,
    /// Indented JSON rendering of `receipt`.
    pub rendered_receipt: String,
}

/// One-shot deposit run against a node.
pub struct DepositFlow<'a, N: ?Sized> {
    client: &'a N,
    config: &'a DepositConfig,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a, N> DepositFlow<'a, N>
where
    N: NodeClient + ?Sized,
{
    pub fn new(
        client: &'a N,
        config: &'a DepositConfig,
        policy: PollPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            config,
            policy,
            cancel,
        }
    }

    /// Run the whole flow with a freshly generated account.
    pub async fn run(&self) -> Result<DepositOutcome, FlowError> {
        self.run_with_account(Account::generate()).await
    }

    /// Run the whole flow with the given account.
    pub async fn run_with_account(&self, account: Account) -> Result<DepositOutcome, FlowError> {
        self.guarded("fund", self.fund(&account)).await?;
        let ctx = self
            .guarded("chain_context", self.chain_context(account))
            .await?;

        let transfer_hash = self.guarded("transfer", self.send_transfer(&ctx)).await?;
        if self.config.funding.await_transfer_receipt {
            self.confirm(transfer_hash, "transferTx").await?;
        }

        let portal = self.await_portal().await?;
        let deposit_hash = self
            .guarded("deposit", self.submit_deposit(&ctx, &portal))
            .await?;
        let receipt = self.confirm(deposit_hash, "depositTx").await?;

        let rendered_receipt = render_receipt(&receipt).map_err(FlowError::Report)?;
        tracing::info!(deposit_tx = %deposit_hash, "deposit receipt ready");

        Ok(DepositOutcome {
            account: ctx.address(),
            transfer_hash,
            deposit_hash,
            receipt,
            rendered_receipt,
        })
    }

    /// Run one step unless the token fires first. The step's future is
    /// dropped on cancellation, which abandons any in-flight node call.
    async fn guarded<T, F>(&self, step: &'static str, fut: F) -> Result<T, FlowError>
    where
        F: Future<Output = Result<T, FlowError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::warn!(step, "run cancelled");
                Err(FlowError::Cancelled { step })
            }
            result = fut => result,
        }
    }

    async fn fund(&self, account: &Account) -> Result<(), FlowError> {
        let balance = self.config.funding.seed_balance_wei;
        self.client
            .set_balance(account.address(), balance)
            .await
            .map_err(FlowError::Funding)?;
        tracing::info!(address = %account.address(), %balance, "account funded");
        Ok(())
    }

    async fn chain_context(&self, account: Account) -> Result<FlowContext, FlowError> {
        let gas_price = self.client.gas_price().await.map_err(FlowError::ChainQuery)?;
        let chain_id = self.client.chain_id().await.map_err(FlowError::ChainQuery)?;
        tracing::debug!(gas_price, %chain_id, "chain parameters");
        Ok(FlowContext::new(account, chain_id, gas_price))
    }

    async fn send_transfer(&self, ctx: &FlowContext) -> Result<TxHash, FlowError> {
        let funding = &self.config.funding;
        // Fresh account, so the first nonce is known without asking.
        let request = TxRequest::transfer(
            0,
            Some(Address::ZERO),
            funding.transfer_value_wei,
            funding.transfer_gas_limit,
            ctx.gas_price,
        );

        let signed = ctx
            .account
            .sign(&request, ctx.chain_id)
            .map_err(FlowError::Signing)?;
        let submitted = broadcast(self.client, signed)
            .await
            .map_err(FlowError::Transfer)?;

        tracing::info!("tx sent: {}", submitted.hash());
        Ok(submitted.hash())
    }

    async fn await_portal(&self) -> Result<PortalBinding<'a, N>, FlowError> {
        let bridge = &self.config.bridge;
        let portal =
            PortalBinding::at(&bridge.portal_address, self.client).map_err(FlowError::Binding)?;

        wait_for_contract(self.client, portal.address(), &bridge.label, self.policy, &self.cancel)
            .await
            .map_err(FlowError::BridgeReadiness)?;

        tracing::info!(address = %portal.address(), "portal created");
        Ok(portal)
    }

    async fn submit_deposit(
        &self,
        ctx: &FlowContext,
        portal: &PortalBinding<'a, N>,
    ) -> Result<TxHash, FlowError> {
        let nonce = self
            .client
            .nonce_at(ctx.address())
            .await
            .map_err(FlowError::Nonce)?;
        tracing::info!(nonce, "user nonce");

        let deposit = &self.config.deposit;
        let opts = TransactOpts {
            from: ctx.address(),
            signer: ctx.account.signer_fn(ctx.chain_id),
            gas_price: ctx.gas_price,
            gas_limit: deposit.gas_limit,
            nonce,
            value: deposit.value_wei,
        };
        let args = DepositArgs {
            to: ctx.address(),
            mint: deposit.mint_wei,
            gas_limit: deposit.l2_gas_limit(),
            is_creation: deposit.is_creation,
            data: Default::default(),
        };

        match portal.deposit_transaction(&opts, &args).await {
            Ok(submitted) => {
                tracing::info!("deposit tx sent: {}", submitted.hash());
                Ok(submitted.hash())
            }
            Err(e) => {
                tracing::error!(?opts, ?args, error = %e, "deposit tx rejected");
                Err(FlowError::Deposit(e))
            }
        }
    }

    async fn confirm(&self, tx_hash: TxHash, label: &str) -> Result<TransactionReceipt, FlowError> {
        wait_for_receipt(self.client, tx_hash, label, self.policy, &self.cancel)
            .await
            .map_err(FlowError::Confirmation)
    }
}
