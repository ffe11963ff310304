/// Maximum number of words the operand stack can hold.
pub const STACK_LIMIT: usize = 1024;

/// Size of a memory word, in bytes.
pub const WORD_SIZE: u64 = 32;

/// Default upper bound on the memory of a single call context, in bytes.
pub const MAX_MEMORY_SIZE: u64 = 64 * 1024 * 1024;

/// The value reported by the GAS opcode. Gas is never metered.
pub const GAS_CONSTANT: u64 = 100_000_000_000;

/// Number of preceding blocks whose hashes are visible to BLOCKHASH.
pub const BLOCKHASH_WINDOW: u64 = 256;

/// Default number of times a back-edge loop is re-executed before exploration gives up.
pub const LOOP_ITERATION_CAP: usize = 1000;

/// Default deepest nested frame level explored below the top-level frame.
pub const MAX_CALL_DEPTH: usize = 4;
