use alloy::primitives::U256;

use super::opcodes::{self, push_size};

/// Iterates over the instructions of a bytecode as `(pc, opcode)` pairs, starting at a given pc.
/// PUSH immediates are skipped and never reported as instructions.
///
/// ```
/// use tandem_vm::core::bytecode::Instructions;
///
/// // PUSH2 0x5b5b, JUMPDEST
/// let code = [0x61, 0x5b, 0x5b, 0x5b];
/// let pcs = Instructions::new(&code, 0).map(|(pc, _)| pc).collect::<Vec<_>>();
/// assert_eq!(pcs, vec![0, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct Instructions<'a> {
    code: &'a [u8],
    pc: usize,
}

impl<'a> Instructions<'a> {
    /// Creates an iterator over `code` starting at `pc`.
    pub fn new(code: &'a [u8], pc: usize) -> Self {
        Self { code, pc }
    }
}

impl Iterator for Instructions<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        let pc = self.pc;
        let opcode = *self.code.get(pc)?;
        self.pc = pc.saturating_add(1 + push_size(opcode));
        Some((pc, opcode))
    }
}

/// The set of valid jump destinations of a bytecode: every JUMPDEST byte that is not part of a
/// PUSH immediate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JumpDestinations {
    map: Vec<bool>,
}

impl JumpDestinations {
    /// Scans `code` once and marks every valid jump destination.
    ///
    /// ```
    /// use tandem_vm::core::bytecode::JumpDestinations;
    ///
    /// // PUSH1 0x5b, JUMPDEST
    /// let destinations = JumpDestinations::analyze(&[0x60, 0x5b, 0x5b]);
    /// assert!(!destinations.is_valid(1));
    /// assert!(destinations.is_valid(2));
    /// ```
    pub fn analyze(code: &[u8]) -> Self {
        let mut map = vec![false; code.len()];
        for (pc, opcode) in Instructions::new(code, 0) {
            if opcode == opcodes::JUMPDEST {
                map[pc] = true;
            }
        }
        Self { map }
    }

    /// Whether `pc` is a valid jump destination.
    pub fn is_valid(&self, pc: usize) -> bool {
        self.map.get(pc).copied().unwrap_or(false)
    }

    /// Whether a destination taken from the stack is a valid jump destination.
    pub fn is_valid_word(&self, destination: U256) -> bool {
        usize::try_from(destination).map(|pc| self.is_valid(pc)).unwrap_or(false)
    }

    /// The number of valid jump destinations.
    pub fn len(&self) -> usize {
        self.map.iter().filter(|valid| **valid).count()
    }

    /// Whether the bytecode has no valid jump destinations.
    pub fn is_empty(&self) -> bool {
        !self.map.iter().any(|valid| *valid)
    }
}

/// Reads the immediate of the PUSH instruction at `pc`, right-padding with zeros past the end of
/// code.
///
/// ```
/// use alloy::primitives::U256;
/// use tandem_vm::core::bytecode::push_immediate;
///
/// assert_eq!(push_immediate(&[0x61, 0x01, 0x02], 0), U256::from(0x0102));
/// assert_eq!(push_immediate(&[0x61, 0x01], 0), U256::from(0x0100));
/// ```
pub fn push_immediate(code: &[u8], pc: usize) -> U256 {
    let Some(&opcode) = code.get(pc) else {
        return U256::ZERO;
    };
    let size = push_size(opcode);
    let mut bytes = [0u8; 32];
    let start = pc + 1;
    if start < code.len() {
        let available = (code.len() - start).min(size);
        bytes[32 - size..32 - size + available].copy_from_slice(&code[start..start + available]);
    }
    U256::from_be_bytes(bytes)
}

/// The outcome of scanning forward from an already explored block entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Revisit {
    /// Nothing of interest is reachable before the block halts (or the code ends).
    /// `selfdestruct` is set when the halting opcode is SELFDESTRUCT.
    Skip {
        /// Whether the block ends in SELFDESTRUCT.
        selfdestruct: bool,
    },
    /// The block touches state, starts a new frame, or jumps before halting, so it has to be
    /// executed again.
    Rerun,
}

/// Opcodes that make a revisited block worth executing again.
pub const fn is_interesting(opcode: u8) -> bool {
    matches!(
        opcode,
        opcodes::BALANCE |
            opcodes::EXTCODESIZE |
            opcodes::EXTCODECOPY |
            opcodes::EXTCODEHASH |
            opcodes::JUMP |
            opcodes::JUMPI
    ) || starts_frame(opcode)
}

/// Opcodes that start a new execution frame.
pub const fn starts_frame(opcode: u8) -> bool {
    matches!(
        opcode,
        opcodes::CREATE |
            opcodes::CREATE2 |
            opcodes::CALL |
            opcodes::CALLCODE |
            opcodes::DELEGATECALL |
            opcodes::STATICCALL
    )
}

const fn is_halting(opcode: u8) -> bool {
    matches!(opcode, opcodes::STOP | opcodes::RETURN | opcodes::REVERT | opcodes::SELFDESTRUCT)
}

/// Scans forward from `pc` to decide whether a revisited block needs to run again.
///
/// ```
/// use tandem_vm::core::bytecode::{scan_revisit, Revisit};
///
/// // PUSH1 0x00, SLOAD, STOP
/// assert_eq!(scan_revisit(&[0x60, 0x00, 0x54, 0x00], 0), Revisit::Skip { selfdestruct: false });
/// // PUSH1 0x00, JUMP
/// assert_eq!(scan_revisit(&[0x60, 0x00, 0x56], 0), Revisit::Rerun);
/// ```
pub fn scan_revisit(code: &[u8], pc: usize) -> Revisit {
    for (_, opcode) in Instructions::new(code, pc) {
        if is_interesting(opcode) {
            return Revisit::Rerun;
        }
        if is_halting(opcode) {
            return Revisit::Skip { selfdestruct: opcode == opcodes::SELFDESTRUCT };
        }
    }
    Revisit::Skip { selfdestruct: false }
}

/// Whether a frame-starting opcode appears between `pc` and the first JUMP/JUMPI after it.
pub fn frame_before_jump(code: &[u8], pc: usize) -> bool {
    Instructions::new(code, pc)
        .map(|(_, opcode)| opcode)
        .take_while(|opcode| *opcode != opcodes::JUMP && *opcode != opcodes::JUMPI)
        .any(starts_frame)
}
