use alloy::primitives::U256;
use eyre::Result;

use super::super::{core::Machine, host::Host};

/// ADDRESS - Get address of currently executing account
pub fn address<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let address = Machine::<H>::address_to_u256(&vm.ctx.contract.address);
    vm.push(address);
    Ok(())
}

/// BALANCE - Get balance of the given account
pub fn balance<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let address = vm.pop_address()?;
    let balance = vm.host.balance(&vm.ctx.contract, address);
    vm.push(balance);
    Ok(())
}

/// ORIGIN - Get execution origination address
pub fn origin<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let origin = vm.host.env().origin;
    vm.push(Machine::<H>::address_to_u256(&origin));
    Ok(())
}

/// CALLER - Get caller address
pub fn caller<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let caller = Machine::<H>::address_to_u256(&vm.ctx.contract.caller);
    vm.push(caller);
    Ok(())
}

/// CALLVALUE - Get deposited value by the instruction/transaction responsible for this execution
pub fn callvalue<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let value = vm.ctx.contract.value;
    vm.push(value);
    Ok(())
}

/// CALLDATALOAD - Get a word of input data, zero padded past its end
pub fn calldataload<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let offset = vm.pop_usize()?;
    let input = &vm.ctx.contract.input;

    let mut word = [0u8; 32];
    if offset < input.len() {
        let available = (input.len() - offset).min(32);
        word[..available].copy_from_slice(&input[offset..offset + available]);
    }

    vm.push(U256::from_be_bytes(word));
    Ok(())
}

/// CALLDATASIZE - Get size of input data in current environment
pub fn calldatasize<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let size = vm.ctx.contract.input.len();
    vm.push(U256::from(size));
    Ok(())
}

/// CALLDATACOPY - Copy input data in current environment to memory
pub fn calldatacopy<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let destination = vm.pop_usize()?;
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    let contract = vm.ctx.contract.clone();
    vm.ctx.memory.copy_from(destination, &contract.input, offset, size);
    Ok(())
}

/// CODESIZE - Get size of code running in current environment
pub fn codesize<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let size = vm.ctx.contract.code.len();
    vm.push(U256::from(size));
    Ok(())
}

/// CODECOPY - Copy code running in current environment to memory
pub fn codecopy<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let destination = vm.pop_usize()?;
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    let contract = vm.ctx.contract.clone();
    vm.ctx.memory.copy_from(destination, &contract.code, offset, size);
    Ok(())
}

/// GASPRICE - Get price of gas in current environment
pub fn gasprice<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let gas_price = vm.host.env().gas_price;
    vm.push(gas_price);
    Ok(())
}

/// EXTCODESIZE - Get size of an account's code
pub fn extcodesize<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let address = vm.pop_address()?;
    let size = vm.host.code_size(&vm.ctx.contract, address);
    vm.push(size);
    Ok(())
}

/// EXTCODECOPY - Copy an account's code to memory
pub fn extcodecopy<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let address = vm.pop_address()?;
    let destination = vm.pop_usize()?;
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    let code = vm.host.code(&vm.ctx.contract, address);
    vm.ctx.memory.copy_from(destination, &code, offset, size);
    Ok(())
}

/// RETURNDATASIZE - Get size of output data from the previous call
pub fn returndatasize<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let size = vm.ctx.return_data.len();
    vm.push(U256::from(size));
    Ok(())
}

/// RETURNDATACOPY - Copy output data from the previous call to memory
pub fn returndatacopy<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let destination = vm.pop_usize()?;
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    let return_data = vm.ctx.return_data.clone();
    vm.ctx.memory.copy_from(destination, &return_data, offset, size);
    Ok(())
}

/// EXTCODEHASH - Get hash of an account's code
pub fn extcodehash<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let address = vm.pop_address()?;
    let hash = vm.host.code_hash(&vm.ctx.contract, address);
    vm.push(U256::from_be_bytes(hash.0));
    Ok(())
}

/// BLOCKHASH - Get the hash of one of the 256 most recent complete blocks
pub fn blockhash<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let number = vm.pop()?;
    let hash = vm.host.block_hash(number);
    vm.push(U256::from_be_bytes(hash.0));
    Ok(())
}
