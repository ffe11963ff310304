use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256, U256};
use hashbrown::HashMap;

use crate::core::vm::{AbortReason, CallInputs, Contract, CreateInputs, Environment, Host};

use super::{BlockRecord, ExplorationConfig, Explorer};

/// A host that touches no shared state, used to size and render basic blocks.
///
/// Storage, balances and foreign code all read as empty, nested calls succeed with empty output,
/// and creations produce `Address::create` addresses from a per-creator counter.
#[derive(Clone, Debug, Default)]
pub struct GraphHost {
    env: Environment,
    nonces: HashMap<Address, u64>,
}

impl GraphHost {
    /// Creates a graph host reporting `env` to the executing code.
    pub fn new(env: Environment) -> Self {
        Self { env, nonces: HashMap::new() }
    }
}

impl Host for GraphHost {
    fn env(&self) -> &Environment {
        &self.env
    }

    fn balance(&mut self, _contract: &Contract, _address: Address) -> U256 {
        U256::ZERO
    }

    fn self_balance(&mut self, _contract: &Contract) -> U256 {
        U256::ZERO
    }

    fn code(&mut self, _contract: &Contract, _address: Address) -> Bytes {
        Bytes::new()
    }

    fn code_size(&mut self, _contract: &Contract, _address: Address) -> U256 {
        U256::ZERO
    }

    fn code_hash(&mut self, _contract: &Contract, _address: Address) -> B256 {
        B256::ZERO
    }

    fn block_hash(&mut self, _number: U256) -> B256 {
        B256::ZERO
    }

    fn sload(&mut self, _contract: &Contract, _key: U256) -> U256 {
        U256::ZERO
    }

    fn sstore(&mut self, _contract: &Contract, _key: U256, _value: U256) {}

    fn tload(&mut self, _contract: &Contract, _key: U256) -> U256 {
        U256::ZERO
    }

    fn tstore(&mut self, _contract: &Contract, _key: U256, _value: U256) {}

    fn call(&mut self, _inputs: CallInputs) -> Result<Bytes, AbortReason> {
        Ok(Bytes::new())
    }

    fn create(&mut self, inputs: CreateInputs) -> Result<Address, AbortReason> {
        let nonce = self.nonces.entry(inputs.caller).or_insert(0);
        let address = inputs.caller.create(*nonce);
        *nonce += 1;
        Ok(address)
    }

    fn selfdestruct(&mut self, _contract: &Contract, _beneficiary: Address) {}
}

/// Explores `code` as a top-level frame against a [`GraphHost`] and returns its basic blocks.
pub fn build_graph(
    code: &Bytes,
    config: &ExplorationConfig,
) -> Result<Vec<BlockRecord>, AbortReason> {
    let contract =
        Arc::new(Contract::new(Address::ZERO, Address::ZERO, code.clone(), Bytes::new(), U256::ZERO));
    let explorer = Explorer::new(config.clone().recording());
    explorer.explore(&mut GraphHost::default(), contract, 0)
}
