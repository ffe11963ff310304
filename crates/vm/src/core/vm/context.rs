use std::sync::Arc;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

use crate::core::{constants::GAS_CONSTANT, memory::Memory, stack::Stack};

/// The [`Contract`] a call frame executes: who called it, whose storage it runs against, and
/// what code and input it runs with. A contract never changes once its frame starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contract {
    /// The address that invoked this frame.
    pub caller: Address,

    /// The address whose storage and balance this frame operates on.
    pub address: Address,

    /// The code being executed.
    pub code: Bytes,

    /// `keccak256(code)`.
    pub code_hash: B256,

    /// The call input (calldata). Empty for init code.
    pub input: Bytes,

    /// The value transferred with the call.
    pub value: U256,
}

impl Contract {
    /// Creates a new [`Contract`], hashing its code.
    ///
    /// ```
    /// use alloy::primitives::{keccak256, Address, Bytes, U256};
    /// use tandem_vm::core::vm::Contract;
    ///
    /// let contract = Contract::new(
    ///     Address::ZERO,
    ///     Address::repeat_byte(0xc0),
    ///     Bytes::from_static(&[0x00]),
    ///     Bytes::new(),
    ///     U256::ZERO,
    /// );
    /// assert_eq!(contract.code_hash, keccak256([0x00]));
    /// ```
    pub fn new(caller: Address, address: Address, code: Bytes, input: Bytes, value: U256) -> Self {
        let code_hash = keccak256(&code);
        Self { caller, address, code, code_hash, input, value }
    }
}

/// The mutable state of one path through a call frame.
///
/// Cloning a [`CallContext`] forks it: stack, memory and return data are copied, and the
/// contract is shared.
#[derive(Clone, Debug)]
pub struct CallContext {
    /// The operand stack.
    pub stack: Stack,

    /// The frame's memory.
    pub memory: Memory,

    /// The contract being executed.
    pub contract: Arc<Contract>,

    /// Output of the last successful nested call made from this context.
    pub return_data: Bytes,
}

impl CallContext {
    /// Creates a fresh context with an empty stack and memory.
    pub fn new(contract: Arc<Contract>) -> Self {
        Self { stack: Stack::new(), memory: Memory::new(), contract, return_data: Bytes::new() }
    }
}

/// Transaction and block level values visible to the executing code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    /// The transaction sender.
    pub origin: Address,

    /// The transaction's gas price.
    pub gas_price: U256,

    /// The block beneficiary.
    pub coinbase: Address,

    /// The block timestamp.
    pub timestamp: u64,

    /// The block number.
    pub number: u64,

    /// The block's difficulty, or prevrandao after the merge.
    pub prevrandao: U256,

    /// The block gas limit.
    pub gas_limit: u64,

    /// The chain id.
    pub chain_id: u64,

    /// The block base fee.
    pub base_fee: U256,

    /// The value reported by GAS. Gas is never metered.
    pub gas_constant: u64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            origin: Address::ZERO,
            gas_price: U256::ZERO,
            coinbase: Address::ZERO,
            timestamp: 0,
            number: 0,
            prevrandao: U256::ZERO,
            gas_limit: 0,
            chain_id: 1,
            base_fee: U256::ZERO,
            gas_constant: GAS_CONSTANT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forked_context_is_independent() {
        let contract = Arc::new(Contract::default());
        let mut ctx = CallContext::new(contract);
        ctx.stack.push(U256::from(1));
        ctx.memory.store(0, &[0xaa]);

        let mut fork = ctx.clone();
        fork.stack.push(U256::from(2));
        fork.memory.store(0, &[0xbb]);
        fork.return_data = Bytes::from_static(&[0x01]);

        assert_eq!(ctx.stack.size(), 1);
        assert_eq!(ctx.memory.read(0, 1), vec![0xaa]);
        assert!(ctx.return_data.is_empty());
        assert!(Arc::ptr_eq(&ctx.contract, &fork.contract));
    }
}
