use eyre::Result;
use tandem_common::utils::strings::sign_uint;

use super::super::{core::Machine, host::Host};

/// LT - Less than comparison
pub fn lt<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push_boolean(a < b);
    Ok(())
}

/// GT - Greater than comparison
pub fn gt<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push_boolean(a > b);
    Ok(())
}

/// SLT - Signed less than comparison
pub fn slt<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = sign_uint(vm.pop()?);
    let b = sign_uint(vm.pop()?);
    vm.push_boolean(a < b);
    Ok(())
}

/// SGT - Signed greater than comparison
pub fn sgt<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = sign_uint(vm.pop()?);
    let b = sign_uint(vm.pop()?);
    vm.push_boolean(a > b);
    Ok(())
}

/// EQ - Equality comparison
pub fn eq<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push_boolean(a == b);
    Ok(())
}

/// ISZERO - Is zero check
pub fn iszero<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    vm.push_boolean(a.is_zero());
    Ok(())
}
