use alloy::primitives::U256;
use eyre::Result;

use super::super::{core::Machine, host::Host};

/// MLOAD - Load word from memory
pub fn mload<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let offset = vm.pop_usize()?;
    let word = U256::from_be_slice(&vm.ctx.memory.read(offset, 32));
    vm.push(word);
    Ok(())
}

/// MSTORE - Save word to memory
pub fn mstore<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let offset = vm.pop_usize()?;
    let value = vm.pop()?;
    vm.ctx.memory.store(offset, &value.to_be_bytes::<32>());
    Ok(())
}

/// MSTORE8 - Save byte to memory
pub fn mstore8<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let offset = vm.pop_usize()?;
    let value = vm.pop()?;
    vm.ctx.memory.store(offset, &[value.byte(0)]);
    Ok(())
}

/// MSIZE - Get the size of active memory in bytes
pub fn msize<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let size = vm.ctx.memory.size();
    vm.push(U256::from(size));
    Ok(())
}

/// MCOPY - Copy memory areas
pub fn mcopy<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let destination = vm.pop_usize()?;
    let source = vm.pop_usize()?;
    let size = vm.pop_usize()?;
    vm.ctx.memory.copy_within(destination, source, size);
    Ok(())
}
