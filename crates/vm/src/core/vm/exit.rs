use alloy::primitives::{Address, U256};

/// Structural failures of the interpreter. None of them has a side effect: the failing opcode
/// does not execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// An undefined opcode, or INVALID.
    #[error("invalid opcode")]
    InvalidOpcode,
    /// Fewer stack items than the opcode consumes.
    #[error("stack underflow")]
    StackUnderflow,
    /// The opcode would grow the stack past its limit.
    #[error("stack overflow")]
    StackOverflow,
    /// Offset plus size overflows.
    #[error("memory size overflow")]
    MemorySizeOverflow,
    /// The memory request is larger than the configured maximum.
    #[error("memory limit exceeded")]
    MemoryLimitExceeded,
}

/// Why the analysis of a transaction was abandoned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AbortReason {
    /// A structural interpreter failure.
    #[error("{failure} at pc {pc}")]
    Failure {
        /// The failure.
        failure: Failure,
        /// Where it happened.
        pc: usize,
    },
    /// A frame nested deeper than the configured call depth.
    #[error("call depth exceeded at level {level}")]
    DepthExceeded {
        /// The level of the rejected frame.
        level: usize,
    },
    /// A loop did not take its exit branch within the iteration cap.
    #[error("loop at pc {start} did not exit within {cap} iterations")]
    LoopIterationLimit {
        /// The loop's entry pc.
        start: usize,
        /// The iteration cap.
        cap: usize,
    },
    /// A loop iteration failed, halted or reverted.
    #[error("loop at pc {start} did not converge")]
    LoopDidNotConverge {
        /// The loop's entry pc.
        start: usize,
    },
    /// A loop body starts a new execution frame.
    #[error("loop at pc {start} starts a new execution frame")]
    LoopContainsCall {
        /// The loop's entry pc.
        start: usize,
    },
    /// No path of a callee produced return data.
    #[error("callee at level {level} produced no return data")]
    MissingReturnData {
        /// The callee's level.
        level: usize,
    },
    /// The paths of a callee produced different return data.
    #[error("callee at level {level} produced {count} distinct return payloads")]
    AmbiguousReturnData {
        /// The callee's level.
        level: usize,
        /// The number of distinct payloads.
        count: usize,
    },
    /// A created address was registered twice for the same level.
    #[error("address {address} already registered at level {level}")]
    AddressAlreadyRegistered {
        /// The level.
        level: usize,
        /// The address that was being registered.
        address: Address,
    },
    /// An internal interpreter error.
    #[error("interpreter error: {0}")]
    Interpreter(String),
}

/// How a run of the interpreter over one basic block ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exit {
    /// STOP, RETURN or SELFDESTRUCT.
    Halt,
    /// REVERT.
    Revert,
    /// JUMP or JUMPI. The destination is reported, not taken.
    Jump {
        /// The destination. Not necessarily valid.
        destination: U256,
        /// The condition popped by JUMPI, `None` for JUMP.
        condition: Option<U256>,
    },
    /// The program counter ran past the end of code.
    EndOfCode,
    /// A structural failure.
    Failure(Failure),
    /// The host gave up, e.g. on an ambiguous nested call.
    Abort(AbortReason),
}

impl Exit {
    /// Whether the run ended in a jump.
    pub fn is_jump(&self) -> bool {
        matches!(self, Exit::Jump { .. })
    }
}
