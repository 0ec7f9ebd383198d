use alloy::primitives::Address;

use crate::blockchain::{Account, ChainId};

/// Values every transaction-building step needs, fixed once the chain has
/// been queried.
#[derive(Debug, Clone)]
pub struct FlowContext {
    pub account: Account,
    pub chain_id: ChainId,
    pub gas_price: u128,
}

impl FlowContext {
    pub fn new(account: Account, chain_id: ChainId, gas_price: u128) -> Self {
        Self {
            account,
            chain_id,
            gas_price,
        }
    }

    pub fn address(&self) -> Address {
        self.account.address()
    }
}
