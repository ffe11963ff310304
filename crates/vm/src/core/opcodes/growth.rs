//! Each function returns the end (exclusive) of the memory region an opcode will touch, computed
//! from the operands on the stack before the opcode executes. Operands are counted from the top
//! of the stack, so `0` is the top.

use crate::core::{constants::WORD_SIZE, stack::Stack};

/// `offset + size` from the stack operands at `offset` and `size`.
/// A zero size touches nothing, whatever the offset.
fn region(stack: &Stack, offset: usize, size: usize) -> Option<u64> {
    let size = stack.peek(size);
    if size.is_zero() {
        return Some(0);
    }

    let offset: u64 = stack.peek(offset).try_into().ok()?;
    let size: u64 = size.try_into().ok()?;
    offset.checked_add(size)
}

fn fixed(stack: &Stack, offset: usize, size: u64) -> Option<u64> {
    let offset: u64 = stack.peek(offset).try_into().ok()?;
    offset.checked_add(size)
}

fn widest(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    Some(a?.max(b?))
}

/// SHA3, RETURN, REVERT and LOG0..LOG4: `(offset, size)` on top of the stack.
pub fn offset_size(stack: &Stack) -> Option<u64> {
    region(stack, 0, 1)
}

/// CALLDATACOPY, CODECOPY and RETURNDATACOPY: `(dest_offset, _, size)`.
pub fn data_copy(stack: &Stack) -> Option<u64> {
    region(stack, 0, 2)
}

/// EXTCODECOPY: `(address, dest_offset, _, size)`.
pub fn ext_code_copy(stack: &Stack) -> Option<u64> {
    region(stack, 1, 3)
}

/// MLOAD and MSTORE touch one word at the offset on top of the stack.
pub fn word(stack: &Stack) -> Option<u64> {
    fixed(stack, 0, WORD_SIZE)
}

/// MSTORE8 touches one byte.
pub fn byte(stack: &Stack) -> Option<u64> {
    fixed(stack, 0, 1)
}

/// CREATE and CREATE2: `(value, offset, size, ..)`.
pub fn create(stack: &Stack) -> Option<u64> {
    region(stack, 1, 2)
}

/// MCOPY: `(dest, source, size)`. Both regions must fit.
pub fn mcopy(stack: &Stack) -> Option<u64> {
    widest(region(stack, 0, 2), region(stack, 1, 2))
}

/// CALL and CALLCODE: `(gas, address, value, args_offset, args_size, ret_offset, ret_size)`.
pub fn call(stack: &Stack) -> Option<u64> {
    widest(region(stack, 5, 6), region(stack, 3, 4))
}

/// DELEGATECALL and STATICCALL: `(gas, address, args_offset, args_size, ret_offset, ret_size)`.
pub fn delegate_call(stack: &Stack) -> Option<u64> {
    widest(region(stack, 4, 5), region(stack, 2, 3))
}
