use alloy::primitives::{Address, U256};
use eyre::Result;

#[cfg(feature = "step-tracing")]
use tracing::trace;

use crate::core::{
    constants::MAX_MEMORY_SIZE,
    memory::Memory,
    opcodes::{self, OpCodeInfo},
};

use super::{
    context::CallContext,
    exit::{Exit, Failure},
    handlers,
    host::Host,
};

/// How JUMPI treats its condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchPolicy {
    /// Report the destination whatever the condition. The caller explores both successors.
    #[default]
    Speculative,
    /// Evaluate the condition: report the destination when it is non-zero and the fallthrough
    /// (`pc + 1`) when it is zero. Used to step through loops one iteration at a time.
    Resolve,
}

/// The [`Interpreter`] executes a basic block: it runs opcodes from a starting pc until the
/// block halts, reverts, jumps, falls off the end of the code, or fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interpreter {
    /// How JUMPI is evaluated.
    pub policy: BranchPolicy,

    /// Upper bound on the memory of a context, in bytes.
    pub max_memory_size: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self { policy: BranchPolicy::Speculative, max_memory_size: MAX_MEMORY_SIZE }
    }
}

impl Interpreter {
    /// Creates an interpreter with the given branch policy and the default memory limit.
    pub fn new(policy: BranchPolicy) -> Self {
        Self { policy, ..Default::default() }
    }

    /// Sets the memory limit.
    pub fn with_max_memory_size(mut self, max_memory_size: u64) -> Self {
        self.max_memory_size = max_memory_size;
        self
    }

    /// Runs the block starting at `pc` against `ctx`.
    ///
    /// On return `pc` points at the opcode that ended the block (or at the end of the code), so
    /// the fallthrough successor of a JUMPI is `pc + 1`.
    ///
    /// An `Err` means the interpreter itself misbehaved; every EVM-level outcome is an [`Exit`].
    pub fn run<H: Host>(&self, ctx: &mut CallContext, pc: &mut usize, host: &mut H) -> Result<Exit> {
        let code = ctx.contract.code.clone();
        let mut vm = Machine { ctx, host, pc: *pc, policy: self.policy, exit: None };

        let exit = loop {
            let Some(&opcode) = code.get(vm.pc) else {
                break Exit::EndOfCode;
            };

            let info = match OpCodeInfo::lookup(opcode) {
                Some(info) if opcode != opcodes::INVALID => info,
                _ => break Exit::Failure(Failure::InvalidOpcode),
            };

            let depth = vm.ctx.stack.size();
            if depth < info.min_stack() {
                break Exit::Failure(Failure::StackUnderflow);
            }
            if depth > info.max_stack() {
                break Exit::Failure(Failure::StackOverflow);
            }

            if let Some(memory_size) = info.memory_size_fn() {
                let Some(required) = memory_size(&vm.ctx.stack).and_then(Memory::words_for) else {
                    break Exit::Failure(Failure::MemorySizeOverflow);
                };
                if required > self.max_memory_size {
                    break Exit::Failure(Failure::MemoryLimitExceeded);
                }
                vm.ctx.memory.resize(required as usize);
            }

            #[cfg(feature = "step-tracing")]
            trace!(pc = vm.pc, opcode = info.name(), stack = %vm.ctx.stack, "executing opcode");

            vm.step(opcode)?;

            if let Some(exit) = vm.exit.take() {
                break exit;
            }
            if info.reverts() {
                break Exit::Revert;
            }
            if info.halts() {
                break Exit::Halt;
            }
            vm.pc += 1;
        };

        *pc = vm.pc;
        Ok(exit)
    }
}

/// The [`Machine`] is the state a handler sees while one opcode executes: the call context, the
/// host, and the program counter.
pub struct Machine<'a, H: Host> {
    /// The context being executed.
    pub ctx: &'a mut CallContext,

    /// The host serving state and nested frames.
    pub host: &'a mut H,

    /// The pc of the executing opcode. PUSH handlers advance it past their immediates.
    pub pc: usize,

    /// How JUMPI is evaluated.
    pub policy: BranchPolicy,

    /// Set by a handler to end the block.
    pub exit: Option<Exit>,
}

impl<H: Host> Machine<'_, H> {
    /// Pops a word off the stack.
    pub(crate) fn pop(&mut self) -> Result<U256> {
        self.ctx.stack.pop()
    }

    /// Pops a word and saturates it into a `usize`. Used for offsets and sizes, which memory
    /// growth has already bounded whenever they matter.
    pub(crate) fn pop_usize(&mut self) -> Result<usize> {
        Ok(self.pop()?.try_into().unwrap_or(usize::MAX))
    }

    /// Pops a word and truncates it to an address.
    pub(crate) fn pop_address(&mut self) -> Result<Address> {
        Ok(Self::u256_to_address(self.pop()?))
    }

    /// Pushes a word onto the stack.
    pub(crate) fn push(&mut self, value: U256) {
        self.ctx.stack.push(value);
    }

    /// Push a boolean value onto the stack
    pub(crate) fn push_boolean(&mut self, condition: bool) {
        self.push(if condition { U256::from(1u8) } else { U256::ZERO });
    }

    /// Convert an address to U256
    pub(crate) fn address_to_u256(address: &Address) -> U256 {
        let mut result = [0u8; 32];
        result[12..].copy_from_slice(address.as_ref());
        U256::from_be_bytes(result)
    }

    /// Convert a U256 to an address, keeping the low 20 bytes
    pub(crate) fn u256_to_address(value: U256) -> Address {
        Address::from_word(value.to_be_bytes::<32>().into())
    }

    /// Executes a single opcode. Stack depth and memory have been checked by the caller.
    fn step(&mut self, opcode: u8) -> Result<()> {
        match opcode {
            opcodes::STOP => {}

            opcodes::ADD => handlers::arithmetic::add(self)?,
            opcodes::MUL => handlers::arithmetic::mul(self)?,
            opcodes::SUB => handlers::arithmetic::sub(self)?,
            opcodes::DIV => handlers::arithmetic::div(self)?,
            opcodes::SDIV => handlers::arithmetic::sdiv(self)?,
            opcodes::MOD => handlers::arithmetic::modulo(self)?,
            opcodes::SMOD => handlers::arithmetic::smod(self)?,
            opcodes::ADDMOD => handlers::arithmetic::addmod(self)?,
            opcodes::MULMOD => handlers::arithmetic::mulmod(self)?,
            opcodes::EXP => handlers::arithmetic::exp(self)?,
            opcodes::SIGNEXTEND => handlers::arithmetic::signextend(self)?,

            opcodes::LT => handlers::comparison::lt(self)?,
            opcodes::GT => handlers::comparison::gt(self)?,
            opcodes::SLT => handlers::comparison::slt(self)?,
            opcodes::SGT => handlers::comparison::sgt(self)?,
            opcodes::EQ => handlers::comparison::eq(self)?,
            opcodes::ISZERO => handlers::comparison::iszero(self)?,

            opcodes::AND => handlers::bitwise::and(self)?,
            opcodes::OR => handlers::bitwise::or(self)?,
            opcodes::XOR => handlers::bitwise::xor(self)?,
            opcodes::NOT => handlers::bitwise::not(self)?,
            opcodes::BYTE => handlers::bitwise::byte(self)?,
            opcodes::SHL => handlers::bitwise::shl(self)?,
            opcodes::SHR => handlers::bitwise::shr(self)?,
            opcodes::SAR => handlers::bitwise::sar(self)?,

            opcodes::SHA3 => handlers::crypto::sha3(self)?,

            opcodes::ADDRESS => handlers::environment::address(self)?,
            opcodes::BALANCE => handlers::environment::balance(self)?,
            opcodes::ORIGIN => handlers::environment::origin(self)?,
            opcodes::CALLER => handlers::environment::caller(self)?,
            opcodes::CALLVALUE => handlers::environment::callvalue(self)?,
            opcodes::CALLDATALOAD => handlers::environment::calldataload(self)?,
            opcodes::CALLDATASIZE => handlers::environment::calldatasize(self)?,
            opcodes::CALLDATACOPY => handlers::environment::calldatacopy(self)?,
            opcodes::CODESIZE => handlers::environment::codesize(self)?,
            opcodes::CODECOPY => handlers::environment::codecopy(self)?,
            opcodes::GASPRICE => handlers::environment::gasprice(self)?,
            opcodes::EXTCODESIZE => handlers::environment::extcodesize(self)?,
            opcodes::EXTCODECOPY => handlers::environment::extcodecopy(self)?,
            opcodes::RETURNDATASIZE => handlers::environment::returndatasize(self)?,
            opcodes::RETURNDATACOPY => handlers::environment::returndatacopy(self)?,
            opcodes::EXTCODEHASH => handlers::environment::extcodehash(self)?,
            opcodes::BLOCKHASH => handlers::environment::blockhash(self)?,

            opcodes::COINBASE => handlers::block::coinbase(self)?,
            opcodes::TIMESTAMP => handlers::block::timestamp(self)?,
            opcodes::NUMBER => handlers::block::number(self)?,
            opcodes::PREVRANDAO => handlers::block::prevrandao(self)?,
            opcodes::GASLIMIT => handlers::block::gaslimit(self)?,
            opcodes::CHAINID => handlers::block::chainid(self)?,
            opcodes::SELFBALANCE => handlers::block::selfbalance(self)?,
            opcodes::BASEFEE => handlers::block::basefee(self)?,
            opcodes::BLOBHASH => handlers::block::blobhash(self)?,
            opcodes::BLOBBASEFEE => handlers::block::blobbasefee(self)?,

            opcodes::POP => handlers::stack::pop(self)?,
            opcodes::MLOAD => handlers::memory::mload(self)?,
            opcodes::MSTORE => handlers::memory::mstore(self)?,
            opcodes::MSTORE8 => handlers::memory::mstore8(self)?,
            opcodes::SLOAD => handlers::storage::sload(self)?,
            opcodes::SSTORE => handlers::storage::sstore(self)?,
            opcodes::JUMP => handlers::control::jump(self)?,
            opcodes::JUMPI => handlers::control::jumpi(self)?,
            opcodes::PC => handlers::control::pc(self)?,
            opcodes::MSIZE => handlers::memory::msize(self)?,
            opcodes::GAS => handlers::control::gas(self)?,
            opcodes::JUMPDEST => {}
            opcodes::TLOAD => handlers::storage::tload(self)?,
            opcodes::TSTORE => handlers::storage::tstore(self)?,
            opcodes::MCOPY => handlers::memory::mcopy(self)?,

            opcodes::PUSH0 => handlers::stack::push0(self)?,
            (opcodes::PUSH1..=opcodes::PUSH32) => handlers::stack::push_n(self, opcode)?,
            (opcodes::DUP1..=opcodes::DUP16) => handlers::stack::dup_n(self, opcode)?,
            (opcodes::SWAP1..=opcodes::SWAP16) => handlers::stack::swap_n(self, opcode)?,

            (opcodes::LOG0..=opcodes::LOG4) => handlers::logging::log_n(self, opcode - opcodes::LOG0)?,

            opcodes::CREATE => handlers::system::create(self)?,
            opcodes::CALL => handlers::system::call(self)?,
            opcodes::CALLCODE => handlers::system::callcode(self)?,
            opcodes::RETURN => handlers::system::op_return(self)?,
            opcodes::DELEGATECALL => handlers::system::delegatecall(self)?,
            opcodes::CREATE2 => handlers::system::create2(self)?,
            opcodes::STATICCALL => handlers::system::staticcall(self)?,
            opcodes::REVERT => handlers::system::revert(self)?,
            opcodes::SELFDESTRUCT => handlers::system::selfdestruct(self)?,

            _ => self.exit = Some(Exit::Failure(Failure::InvalidOpcode)),
        }

        Ok(())
    }
}
