use eyre::Result;

use super::super::{core::Machine, host::Host};

/// SLOAD - Load word from storage
pub fn sload<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let key = vm.pop()?;
    let value = vm.host.sload(&vm.ctx.contract, key);
    vm.push(value);
    Ok(())
}

/// SSTORE - Save word to storage
pub fn sstore<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let key = vm.pop()?;
    let value = vm.pop()?;
    vm.host.sstore(&vm.ctx.contract, key, value);
    Ok(())
}

/// TLOAD - Load word from transient storage
pub fn tload<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let key = vm.pop()?;
    let value = vm.host.tload(&vm.ctx.contract, key);
    vm.push(value);
    Ok(())
}

/// TSTORE - Save word to transient storage
pub fn tstore<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let key = vm.pop()?;
    let value = vm.pop()?;
    vm.host.tstore(&vm.ctx.contract, key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::super::test_utils::{execute_with, TestHost};
    use alloy::primitives::U256;

    #[test]
    fn test_sstore_then_sload() {
        let mut host = TestHost::default();

        // PUSH1 0x2a, PUSH1 0x01, SSTORE, PUSH1 0x01, SLOAD
        let (_, ctx) = execute_with(&[0x60, 0x2a, 0x60, 0x01, 0x55, 0x60, 0x01, 0x54], &mut host);
        assert_eq!(ctx.stack.peek(0), U256::from(0x2a));
        assert_eq!(host.storage.get(&U256::from(1)), Some(&U256::from(0x2a)));
    }

    #[test]
    fn test_transient_storage_is_separate() {
        let mut host = TestHost::default();

        // PUSH1 0x07, PUSH0, TSTORE, PUSH0, SLOAD, PUSH0, TLOAD
        let (_, ctx) = execute_with(&[0x60, 0x07, 0x5f, 0x5d, 0x5f, 0x54, 0x5f, 0x5c], &mut host);
        assert_eq!(ctx.stack.peek(0), U256::from(7));
        assert_eq!(ctx.stack.peek(1), U256::ZERO);
    }
}
