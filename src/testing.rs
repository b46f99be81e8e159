//! Scriptable in-memory ledger for unit tests

use crate::ledger::LedgerClient;
use crate::{Error, Result};
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Well-known development keys (DO NOT use in production!)
pub(crate) const TEST_KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    ChainId,
    Balance,
    Nonce,
    GasPrice,
    Broadcast,
}

#[derive(Default)]
struct MockState {
    chain_id: u64,
    gas_price: u128,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    pending_failures: HashMap<Op, u32>,
    calls: HashMap<Op, u32>,
    broadcasts: Vec<Bytes>,
}

pub(crate) struct MockLedger {
    state: Mutex<MockState>,
}

impl MockLedger {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                chain_id: 88817,
                gas_price: 1_000_000,
                ..Default::default()
            }),
        }
    }

    pub(crate) fn set_balance(&self, address: Address, wei: U256) {
        self.state.lock().unwrap().balances.insert(address, wei);
    }

    pub(crate) fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().unwrap().nonces.insert(address, nonce);
    }

    pub(crate) fn set_gas_price(&self, wei: u128) {
        self.state.lock().unwrap().gas_price = wei;
    }

    pub(crate) fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().chain_id = chain_id;
    }

    /// Fail the next `count` calls of `op`; `u32::MAX` fails forever
    pub(crate) fn fail_next(&self, op: Op, count: u32) {
        self.state.lock().unwrap().pending_failures.insert(op, count);
    }

    pub(crate) fn calls(&self, op: Op) -> u32 {
        self.state.lock().unwrap().calls.get(&op).copied().unwrap_or(0)
    }

    pub(crate) fn broadcasts(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().broadcasts.clone()
    }

    /// Record the call and decide whether it fails
    fn enter(&self, op: Op) -> Result<std::sync::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_insert(0) += 1;

        if let Some(remaining) = state.pending_failures.get_mut(&op) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(Error::Rpc(format!("{:?} unavailable", op)));
            }
        }

        Ok(state)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.enter(Op::ChainId)?.chain_id)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        let state = self.enter(Op::Balance)?;
        Ok(state.balances.get(&address).copied().unwrap_or(U256::ZERO))
    }

    async fn get_pending_nonce(&self, address: Address) -> Result<u64> {
        let state = self.enter(Op::Nonce)?;
        Ok(state.nonces.get(&address).copied().unwrap_or(0))
    }

    async fn suggest_gas_price(&self) -> Result<u128> {
        Ok(self.enter(Op::GasPrice)?.gas_price)
    }

    async fn broadcast(&self, raw: Bytes) -> Result<B256> {
        let mut state = self.enter(Op::Broadcast)?;
        let hash = keccak256(&raw);
        state.broadcasts.push(raw);
        Ok(hash)
    }
}
