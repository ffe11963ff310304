use std::collections::BTreeSet;

use alloy::primitives::{Address, Bytes};
use hashbrown::HashMap;
use tandem_vm::core::vm::AbortReason;

/// Misuse of a per-level registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A second address was registered at a level whose slot is occupied.
    #[error("address {address} already registered at level {level}")]
    AddressAlreadyRegistered {
        /// The level.
        level: usize,
        /// The rejected address.
        address: Address,
    },
}

impl From<RegistryError> for AbortReason {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::AddressAlreadyRegistered { level, address } => {
                AbortReason::AddressAlreadyRegistered { level, address }
            }
        }
    }
}

/// The distinct RETURN and REVERT payloads observed at each call level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnRegistry {
    levels: HashMap<usize, BTreeSet<Bytes>>,
}

impl ReturnRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the payloads of `level`.
    pub fn renew(&mut self, level: usize) {
        self.levels.insert(level, BTreeSet::new());
    }

    /// Records `payload` at `level`. Empty payloads are ignored.
    pub fn record(&mut self, level: usize, payload: &[u8]) {
        if payload.is_empty() {
            return;
        }
        self.levels.entry(level).or_default().insert(Bytes::copy_from_slice(payload));
    }

    /// The distinct payloads recorded at `level`, in byte order.
    pub fn payloads(&self, level: usize) -> Vec<Bytes> {
        self.levels.get(&level).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }

    /// Every level with at least one payload, ascending.
    pub fn snapshot(&self) -> Vec<(usize, Vec<Bytes>)> {
        let mut levels: Vec<_> = self
            .levels
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(level, set)| (*level, set.iter().cloned().collect()))
            .collect();
        levels.sort_by_key(|(level, _)| *level);
        levels
    }
}

/// The single address created at each call level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateRegistry {
    levels: HashMap<usize, Option<Address>>,
}

impl CreateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the slot of `level`.
    pub fn renew(&mut self, level: usize) {
        self.levels.insert(level, None);
    }

    /// Registers `address` at `level`, failing if the slot is occupied.
    pub fn register(&mut self, level: usize, address: Address) -> Result<(), RegistryError> {
        let slot = self.levels.entry(level).or_default();
        if slot.is_some() {
            return Err(RegistryError::AddressAlreadyRegistered { level, address });
        }
        *slot = Some(address);
        Ok(())
    }

    /// The address registered at `level`, if any.
    pub fn get(&self, level: usize) -> Option<Address> {
        self.levels.get(&level).copied().flatten()
    }

    /// Every occupied level, ascending.
    pub fn snapshot(&self) -> Vec<(usize, Address)> {
        let mut levels: Vec<_> = self
            .levels
            .iter()
            .filter_map(|(level, slot)| slot.map(|address| (*level, address)))
            .collect();
        levels.sort_by_key(|(level, _)| *level);
        levels
    }
}
