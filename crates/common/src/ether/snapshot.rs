//! An in-memory chain snapshot: a set of accounts and a list of blocks, loadable from JSON.
//!
//! ```json
//! {
//!   "accounts": {
//!     "0x00000000000000000000000000000000000000c0": {
//!       "balance": "0x0",
//!       "code": "0x600054",
//!       "storage": { "0x0": "0x1" }
//!     }
//!   },
//!   "blocks": [ { "number": 1, "transactions": [] } ]
//! }
//! ```

use alloy::primitives::{Address, Bytes, U256};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    provider::{ChainDataSource, ProviderError, StateReader},
    types::Block,
};
use crate::{utils::io::file::read_file, Error};

/// The committed state of a single account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// The account balance.
    #[serde(default)]
    pub balance: U256,

    /// The account nonce.
    #[serde(default)]
    pub nonce: u64,

    /// The code deployed at the account.
    #[serde(default)]
    pub code: Bytes,

    /// The account's storage slots.
    #[serde(default)]
    pub storage: HashMap<U256, U256>,
}

/// A [`ChainDataSource`] and [`StateReader`] backed by memory.
///
/// Every block in the snapshot executes on the same committed state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Committed account state, shared by every block in the snapshot.
    #[serde(default)]
    pub accounts: HashMap<Address, AccountState>,

    /// Blocks available from this snapshot.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl ChainSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a snapshot from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Reads and parses a snapshot from a JSON file at `path`.
    pub fn from_file(path: &str) -> Result<Self, Error> {
        let contents = read_file(path)?;
        let snapshot = Self::from_json(&contents)?;
        debug!(
            "loaded snapshot '{}' ({} accounts, {} blocks)",
            path,
            snapshot.accounts.len(),
            snapshot.blocks.len()
        );
        Ok(snapshot)
    }

    /// Adds (or replaces) an account.
    pub fn with_account(mut self, address: Address, account: AccountState) -> Self {
        self.accounts.insert(address, account);
        self
    }

    /// Adds a block.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    fn account(&self, address: &Address) -> Option<&AccountState> {
        self.accounts.get(address)
    }
}

impl ChainDataSource for ChainSnapshot {
    type State<'a> = &'a ChainSnapshot;

    fn get_block(&self, number: u64) -> Result<Block, ProviderError> {
        self.blocks
            .iter()
            .find(|block| block.number == number)
            .cloned()
            .ok_or(ProviderError::NotFound(number))
    }

    fn state_at(&self, _number: u64) -> Result<Self::State<'_>, ProviderError> {
        Ok(self)
    }
}

impl StateReader for ChainSnapshot {
    fn code(&self, address: Address) -> Bytes {
        self.account(&address).map(|account| account.code.clone()).unwrap_or_default()
    }

    fn balance(&self, address: Address) -> U256 {
        self.account(&address).map(|account| account.balance).unwrap_or_default()
    }

    fn nonce(&self, address: Address) -> u64 {
        self.account(&address).map(|account| account.nonce).unwrap_or_default()
    }

    fn storage(&self, address: Address, key: U256) -> U256 {
        self.account(&address)
            .and_then(|account| account.storage.get(&key).copied())
            .unwrap_or_default()
    }
}
