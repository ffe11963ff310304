use alloy::primitives::{I256, U256};
use eyre::Result;
use tandem_common::utils::strings::sign_uint;

use super::super::{core::Machine, host::Host};

/// ADD - Addition operation
pub fn add<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push(a.wrapping_add(b));
    Ok(())
}

/// MUL - Multiplication operation
pub fn mul<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push(a.wrapping_mul(b));
    Ok(())
}

/// SUB - Subtraction operation
pub fn sub<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    vm.push(a.wrapping_sub(b));
    Ok(())
}

/// DIV - Integer division operation
pub fn div<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let numerator = vm.pop()?;
    let denominator = vm.pop()?;
    let result = numerator.checked_div(denominator).unwrap_or(U256::ZERO);
    vm.push(result);
    Ok(())
}

/// SDIV - Signed integer division operation
pub fn sdiv<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let numerator = sign_uint(vm.pop()?);
    let denominator = sign_uint(vm.pop()?);
    let result = if denominator.is_zero() {
        I256::ZERO
    } else {
        // MIN / -1 wraps back to MIN
        numerator.overflowing_div(denominator).0
    };
    vm.push(result.into_raw());
    Ok(())
}

/// MOD - Modulo operation
pub fn modulo<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let modulus = vm.pop()?;
    let result = a.checked_rem(modulus).unwrap_or(U256::ZERO);
    vm.push(result);
    Ok(())
}

/// SMOD - Signed modulo operation
pub fn smod<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = sign_uint(vm.pop()?);
    let modulus = sign_uint(vm.pop()?);
    let result = if modulus.is_zero() { I256::ZERO } else { a.overflowing_rem(modulus).0 };
    vm.push(result.into_raw());
    Ok(())
}

/// ADDMOD - Addition modulo operation
pub fn addmod<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    let modulus = vm.pop()?;
    let result = if modulus.is_zero() { U256::ZERO } else { a.add_mod(b, modulus) };
    vm.push(result);
    Ok(())
}

/// MULMOD - Multiplication modulo operation
pub fn mulmod<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let b = vm.pop()?;
    let modulus = vm.pop()?;
    let result = if modulus.is_zero() { U256::ZERO } else { a.mul_mod(b, modulus) };
    vm.push(result);
    Ok(())
}

/// EXP - Exponential operation
pub fn exp<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let a = vm.pop()?;
    let exponent = vm.pop()?;
    vm.push(a.overflowing_pow(exponent).0);
    Ok(())
}

/// SIGNEXTEND - Extend length of two's complement signed integer
pub fn signextend<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let index = vm.pop()?;
    let value = vm.pop()?;

    // index 31 and above leaves the value untouched
    let result = if index < U256::from(31u8) {
        let bit = index.to::<usize>() * 8 + 7;
        let mask = (U256::from(1u8) << bit).wrapping_sub(U256::from(1u8));
        if value.bit(bit) {
            value | !mask
        } else {
            value & mask
        }
    } else {
        value
    };

    vm.push(result);
    Ok(())
}
