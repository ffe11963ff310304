use alloy::primitives::U256;
use eyre::Result;

use crate::core::{bytecode::push_immediate, opcodes};

use super::super::{core::Machine, host::Host};

/// POP - Remove item from stack
pub fn pop<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    vm.pop()?;
    Ok(())
}

/// PUSH0 - Push 0 onto stack
pub fn push0<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    vm.push(U256::ZERO);
    Ok(())
}

/// PUSH1-PUSH32 - Push N bytes onto stack. Immediates running past the end of the code read as
/// zero, and the pc is left on the last immediate byte.
pub fn push_n<H: Host>(vm: &mut Machine<'_, H>, opcode: u8) -> Result<()> {
    let value = push_immediate(&vm.ctx.contract.code, vm.pc);
    vm.push(value);
    vm.pc += opcodes::push_size(opcode);
    Ok(())
}

/// DUP1-DUP16 - Duplicate Nth stack item
pub fn dup_n<H: Host>(vm: &mut Machine<'_, H>, opcode: u8) -> Result<()> {
    let index = (opcode - opcodes::DUP1 + 1) as usize;
    if !vm.ctx.stack.dup(index) {
        eyre::bail!("DUP{index} on a stack of {} items", vm.ctx.stack.size());
    }
    Ok(())
}

/// SWAP1-SWAP16 - Exchange 1st and Nth stack items
pub fn swap_n<H: Host>(vm: &mut Machine<'_, H>, opcode: u8) -> Result<()> {
    let index = (opcode - opcodes::SWAP1 + 1) as usize;
    if !vm.ctx.stack.swap(index) {
        eyre::bail!("SWAP{index} on a stack of {} items", vm.ctx.stack.size());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::super::test_utils::execute;
    use crate::core::vm::{Exit, Failure};
    use alloy::primitives::U256;

    #[test]
    fn test_truncated_push_is_zero_padded() {
        // PUSH2 0x01
        let (exit, ctx) = execute(&[0x61, 0x01]);
        assert_eq!(exit, Exit::EndOfCode);
        assert_eq!(ctx.stack.peek(0), U256::from(0x0100));
    }

    #[test]
    fn test_dup_and_swap() {
        // PUSH1 1, PUSH1 2, DUP2, SWAP2
        let (_, ctx) = execute(&[0x60, 0x01, 0x60, 0x02, 0x81, 0x91]);
        assert_eq!(ctx.stack.peek(0), U256::from(1));
        assert_eq!(ctx.stack.peek(1), U256::from(2));
        assert_eq!(ctx.stack.peek(2), U256::from(1));
    }

    #[test]
    fn test_dup_underflow_fails() {
        // PUSH1 1, DUP2
        let (exit, ctx) = execute(&[0x60, 0x01, 0x81]);
        assert_eq!(exit, Exit::Failure(Failure::StackUnderflow));
        assert_eq!(ctx.stack.size(), 1);
    }
}
