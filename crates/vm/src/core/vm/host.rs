use alloy::primitives::{Address, Bytes, B256, U256};

use super::{context::Contract, exit::AbortReason, Environment};

/// The flavour of a message call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallScheme {
    /// CALL
    Call,
    /// CALLCODE
    CallCode,
    /// DELEGATECALL
    DelegateCall,
    /// STATICCALL
    StaticCall,
}

impl CallScheme {
    /// The opcode name of the scheme.
    pub fn name(&self) -> &'static str {
        match self {
            CallScheme::Call => "CALL",
            CallScheme::CallCode => "CALLCODE",
            CallScheme::DelegateCall => "DELEGATECALL",
            CallScheme::StaticCall => "STATICCALL",
        }
    }
}

/// A nested message call, with the callee frame already resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallInputs {
    /// How the call was made.
    pub scheme: CallScheme,

    /// The account whose code the callee runs.
    pub code_address: Address,

    /// The callee frame's own address.
    pub address: Address,

    /// The callee frame's caller.
    pub caller: Address,

    /// The callee frame's call value.
    pub value: U256,

    /// The callee frame's input.
    pub input: Bytes,
}

/// The flavour of a contract creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreateScheme {
    /// CREATE: the address is derived from the creator's nonce.
    Create,
    /// CREATE2: the address is derived from a salt and the init code hash.
    Create2 {
        /// The salt.
        salt: U256,
    },
}

/// A nested contract creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateInputs {
    /// How the contract is created.
    pub scheme: CreateScheme,

    /// The creating contract.
    pub caller: Address,

    /// The endowment.
    pub value: U256,

    /// The init code.
    pub init_code: Bytes,
}

/// Everything outside a call frame that the interpreter needs: state, environment, and nested
/// frames. The host decides what reads and writes mean, so one dispatch serves both the
/// state-tracking analysis and the state-free graph builder.
///
/// `contract` is always the frame making the request.
pub trait Host {
    /// The transaction and block environment.
    fn env(&self) -> &Environment;

    /// BALANCE
    fn balance(&mut self, contract: &Contract, address: Address) -> U256;

    /// SELFBALANCE
    fn self_balance(&mut self, contract: &Contract) -> U256;

    /// EXTCODECOPY
    fn code(&mut self, contract: &Contract, address: Address) -> Bytes;

    /// EXTCODESIZE
    fn code_size(&mut self, contract: &Contract, address: Address) -> U256;

    /// EXTCODEHASH. Zero for empty accounts.
    fn code_hash(&mut self, contract: &Contract, address: Address) -> B256;

    /// BLOCKHASH
    fn block_hash(&mut self, number: U256) -> B256;

    /// SLOAD
    fn sload(&mut self, contract: &Contract, key: U256) -> U256;

    /// SSTORE
    fn sstore(&mut self, contract: &Contract, key: U256, value: U256);

    /// TLOAD
    fn tload(&mut self, contract: &Contract, key: U256) -> U256;

    /// TSTORE
    fn tstore(&mut self, contract: &Contract, key: U256, value: U256);

    /// LOG0..LOG4
    fn log(&mut self, _contract: &Contract, _topics: Vec<B256>, _data: Bytes) {}

    /// CALL, CALLCODE, DELEGATECALL and STATICCALL. Returns the callee's output.
    fn call(&mut self, inputs: CallInputs) -> Result<Bytes, AbortReason>;

    /// CREATE and CREATE2. Returns the created address.
    fn create(&mut self, inputs: CreateInputs) -> Result<Address, AbortReason>;

    /// Output of a RETURN or REVERT in the current frame.
    fn record_return(&mut self, _payload: &[u8]) {}

    /// SELFDESTRUCT
    fn selfdestruct(&mut self, contract: &Contract, beneficiary: Address);

    /// A SELFDESTRUCT was found reachable without executing it.
    fn selfdestruct_reachable(&mut self) {}
}
