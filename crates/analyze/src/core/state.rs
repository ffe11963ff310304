use alloy::primitives::{Address, U256};
use hashbrown::HashMap;

/// Speculative state written while one transaction is analyzed.
///
/// Reads return `None` on a miss, and the caller falls back to committed state. Nothing written
/// here ever reaches committed state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShadowState {
    storage: HashMap<Address, HashMap<U256, U256>>,
    balances: HashMap<Address, U256>,
    transient: HashMap<Address, HashMap<U256, U256>>,
}

impl ShadowState {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value written to `key` of `address`, if any.
    pub fn read(&self, address: &Address, key: &U256) -> Option<U256> {
        self.storage.get(address).and_then(|slots| slots.get(key)).copied()
    }

    /// Writes `value` to `key` of `address`.
    pub fn write(&mut self, address: Address, key: U256, value: U256) {
        self.storage.entry(address).or_default().insert(key, value);
    }

    /// The balance written for `address`, if any.
    pub fn balance(&self, address: &Address) -> Option<U256> {
        self.balances.get(address).copied()
    }

    /// Adds `amount` to the balance of `address`. A missing shadow balance starts at zero.
    pub fn credit(&mut self, address: Address, amount: U256) {
        let balance = self.balances.entry(address).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Transient storage. Unwritten slots read as zero.
    pub fn tload(&self, address: &Address, key: &U256) -> U256 {
        self.transient.get(address).and_then(|slots| slots.get(key)).copied().unwrap_or_default()
    }

    /// Writes transient storage.
    pub fn tstore(&mut self, address: Address, key: U256, value: U256) {
        self.transient.entry(address).or_default().insert(key, value);
    }
}
