use std::ops::{Shl, Shr};

use alloy::primitives::U256;
use eyre::Result;
use tandem_common::utils::strings::sign_uint;

use super::super::{core::Machine, host::Host};

/// AND - Bitwise AND operation
pub fn and<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push(a & b);
    Ok(())
}

/// OR - Bitwise OR operation
pub fn or<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push(a | b);
    Ok(())
}

/// XOR - Bitwise XOR operation
pub fn xor<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push(a ^ b);
    Ok(())
}

/// NOT - Bitwise NOT operation
pub fn not<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    vm.push(!a);
    Ok(())
}

/// BYTE - Retrieve single byte from word, counting from the most significant byte
pub fn byte<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let index = vm.pop()?;
    let word = vm.pop()?;
    let result = if index < U256::from(32u8) {
        U256::from(word.byte(31 - index.to::<usize>()))
    } else {
        U256::ZERO
    };
    vm.push(result);
    Ok(())
}

/// SHL - Shift left operation
pub fn shl<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let shift = vm.pop()?;
    let value = vm.pop()?;
    let result =
        if shift > U256::from(255u8) { U256::ZERO } else { value.shl(shift.to::<usize>()) };
    vm.push(result);
    Ok(())
}

/// SHR - Shift right operation
pub fn shr<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let shift = vm.pop()?;
    let value = vm.pop()?;
    let result =
        if shift > U256::from(255u8) { U256::ZERO } else { value.shr(shift.to::<usize>()) };
    vm.push(result);
    Ok(())
}

/// SAR - Arithmetic shift right operation
pub fn sar<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let shift = vm.pop()?;
    let value = sign_uint(vm.pop()?);

    // shifting by 255 or more saturates to the sign
    let shift = if shift > U256::from(255u8) { 255 } else { shift.to::<usize>() };
    vm.push(value.asr(shift).into_raw());
    Ok(())
}
