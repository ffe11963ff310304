use alloy::primitives::U256;
use eyre::Result;

use super::super::{
    core::{BranchPolicy, Machine},
    exit::Exit,
    host::Host,
};

/// JUMP - Report the destination. Validity is checked by whoever follows the jump.
pub fn jump<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let destination = vm.pop()?;
    vm.exit = Some(Exit::Jump { destination, condition: None });
    Ok(())
}

/// JUMPI - Conditionally alter the program counter.
///
/// Under [`BranchPolicy::Speculative`] the destination is reported whatever the condition, and
/// the fallthrough is left to the caller. Under [`BranchPolicy::Resolve`] a zero condition
/// reports the fallthrough `pc + 1` instead.
pub fn jumpi<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let destination = vm.pop()?;
    let condition = vm.pop()?;

    let destination = match vm.policy {
        BranchPolicy::Resolve if condition.is_zero() => U256::from(vm.pc + 1),
        _ => destination,
    };
    vm.exit = Some(Exit::Jump { destination, condition: Some(condition) });
    Ok(())
}

/// PC - Get the value of the program counter prior to the increment
pub fn pc<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let pc = vm.pc;
    vm.push(U256::from(pc));
    Ok(())
}

/// GAS - Gas is not metered; push the configured constant
pub fn gas<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let gas = vm.host.env().gas_constant;
    vm.push(U256::from(gas));
    Ok(())
}
