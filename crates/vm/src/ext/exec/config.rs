use serde::{Deserialize, Serialize};

use crate::core::constants::{GAS_CONSTANT, LOOP_ITERATION_CAP, MAX_CALL_DEPTH, MAX_MEMORY_SIZE};

/// Limits and switches for the [`Explorer`](super::Explorer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// How many times a back-edge loop is re-executed before giving up.
    pub loop_iteration_cap: usize,

    /// The deepest nested frame level explored. The top-level frame is level 0.
    pub max_call_depth: usize,

    /// Upper bound on the memory of a call context, in bytes.
    pub max_memory_size: u64,

    /// The value reported by GAS.
    pub gas_constant: u64,

    /// Whether an invalid opcode aborts the whole exploration instead of ending its branch.
    pub strict_invalid: bool,

    /// Whether basic-block records are collected.
    pub record_blocks: bool,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            loop_iteration_cap: LOOP_ITERATION_CAP,
            max_call_depth: MAX_CALL_DEPTH,
            max_memory_size: MAX_MEMORY_SIZE,
            gas_constant: GAS_CONSTANT,
            strict_invalid: false,
            record_blocks: false,
        }
    }
}

impl ExplorationConfig {
    /// Returns a copy of this configuration with block recording switched on.
    pub fn recording(mut self) -> Self {
        self.record_blocks = true;
        self
    }
}
