//! Binding for the bridge portal's deposit entry point.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::NodeClient;
use crate::blockchain::transaction::{broadcast, SignerFn, SubmittedTransaction, TxRequest};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

sol! {
    /// Queues a deposit to the connected chain.
    #[derive(Debug)]
    function depositTransaction(
        address _to,
        uint256 _value,
        uint64 _gasLimit,
        bool _isCreation,
        bytes _data
    ) payable;
}

/// Options for a state-changing contract call.
#[derive(Clone)]
pub struct TransactOpts {
    pub from: Address,
    pub signer: SignerFn,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
    /// Native value attached to the call.
    pub value: U256,
}

impl std::fmt::Debug for TransactOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactOpts")
            .field("from", &self.from)
            .field("gas_price", &self.gas_price)
            .field("gas_limit", &self.gas_limit)
            .field("nonce", &self.nonce)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// Arguments of `depositTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositArgs {
    /// Recipient on the connected chain.
    pub to: Address,
    /// Value minted to the recipient on the connected chain.
    pub mint: U256,
    /// Gas limit of the resulting transaction on the connected chain.
    pub gas_limit: u64,
    pub is_creation: bool,
    pub data: Bytes,
}

impl DepositArgs {
    /// ABI-encoded call data.
    pub fn calldata(&self) -> Bytes {
        depositTransactionCall {
            _to: self.to,
            _value: self.mint,
            _gasLimit: self.gas_limit,
            _isCreation: self.is_creation,
            _data: self.data.clone(),
        }
        .abi_encode()
        .into()
    }
}

/// Handle on a deployed portal contract.
pub struct PortalBinding<'a, N: ?Sized> {
    address: Address,
    client: &'a N,
}

impl<'a, N> PortalBinding<'a, N>
where
    N: NodeClient + ?Sized,
{
    pub fn new(address: Address, client: &'a N) -> Self {
        Self { address, client }
    }

    /// Bind to a portal given its hex address.
    pub fn at(address: &str, client: &'a N) -> BlockchainResult<Self> {
        let address = address
            .parse()
            .map_err(|_| BlockchainError::InvalidAddress(address.to_string()))?;
        Ok(Self::new(address, client))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign and submit a `depositTransaction` call.
    pub async fn deposit_transaction(
        &self,
        opts: &TransactOpts,
        args: &DepositArgs,
    ) -> BlockchainResult<SubmittedTransaction> {
        let request = TxRequest {
            nonce: opts.nonce,
            to: Some(self.address),
            value: opts.value,
            gas_limit: opts.gas_limit,
            gas_price: opts.gas_price,
            input: args.calldata(),
        };

        let signed = (opts.signer)(opts.from, &request)?;
        broadcast(self.client, signed).await
    }
}
