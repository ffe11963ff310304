//! Collaborator interfaces the analyzer reads chain data and committed state through.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

use super::types::Block;

/// Errors produced by a [`ChainDataSource`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The requested block does not exist in the data source.
    #[error("block #{0} not found")]
    NotFound(u64),
    /// The data source failed to produce the block.
    #[error("provider error: {0}")]
    Other(String),
}

/// A source of blocks, indexed by number, and of the committed state each block executes on.
pub trait ChainDataSource {
    /// The committed state handed out by [`ChainDataSource::state_at`].
    type State<'a>: StateReader
    where
        Self: 'a;

    /// Returns the block at `number`, or [`ProviderError::NotFound`] if it doesn't exist.
    fn get_block(&self, number: u64) -> Result<Block, ProviderError>;

    /// Returns the committed state as of the start of block `number`.
    fn state_at(&self, number: u64) -> Result<Self::State<'_>, ProviderError>;
}

/// Read-only access to committed account and storage state. Missing accounts and slots read as
/// zero.
pub trait StateReader {
    /// The code deployed at `address`.
    fn code(&self, address: Address) -> Bytes;

    /// The balance of `address`.
    fn balance(&self, address: Address) -> U256;

    /// The nonce of `address`.
    fn nonce(&self, address: Address) -> u64;

    /// The value stored at `key` in the storage of `address`.
    fn storage(&self, address: Address, key: U256) -> U256;

    /// Whether `address` is empty: no code, zero nonce and zero balance.
    fn is_empty(&self, address: Address) -> bool {
        self.code(address).is_empty() &&
            self.nonce(address) == 0 &&
            self.balance(address).is_zero()
    }

    /// The size of the code deployed at `address`.
    fn code_size(&self, address: Address) -> usize {
        self.code(address).len()
    }

    /// The keccak256 hash of the code deployed at `address`.
    fn code_hash(&self, address: Address) -> B256 {
        keccak256(self.code(address))
    }
}

impl<T: StateReader + ?Sized> StateReader for &T {
    fn code(&self, address: Address) -> Bytes {
        (**self).code(address)
    }

    fn balance(&self, address: Address) -> U256 {
        (**self).balance(address)
    }

    fn nonce(&self, address: Address) -> u64 {
        (**self).nonce(address)
    }

    fn storage(&self, address: Address, key: U256) -> U256 {
        (**self).storage(address, key)
    }

    fn is_empty(&self, address: Address) -> bool {
        (**self).is_empty(address)
    }

    fn code_size(&self, address: Address) -> usize {
        (**self).code_size(address)
    }

    fn code_hash(&self, address: Address) -> B256 {
        (**self).code_hash(address)
    }
}
