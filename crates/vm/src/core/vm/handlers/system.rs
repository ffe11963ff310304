use alloy::primitives::{Bytes, U256};
use eyre::Result;

use super::super::{
    core::Machine,
    exit::Exit,
    host::{CallInputs, CallScheme, CreateInputs, CreateScheme, Host},
};

/// CREATE - Create a new account with associated code
pub fn create<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let value = vm.pop()?;
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    create_inner(vm, CreateScheme::Create, value, offset, size)
}

/// CREATE2 - Create a new account with associated code at a predictable address
pub fn create2<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let value = vm.pop()?;
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;
    let salt = vm.pop()?;

    create_inner(vm, CreateScheme::Create2 { salt }, value, offset, size)
}

fn create_inner<H: Host>(
    vm: &mut Machine<'_, H>,
    scheme: CreateScheme,
    value: U256,
    offset: usize,
    size: usize,
) -> Result<()> {
    let init_code = Bytes::from(vm.ctx.memory.read(offset, size));
    let inputs = CreateInputs { scheme, caller: vm.ctx.contract.address, value, init_code };

    match vm.host.create(inputs) {
        Ok(address) => vm.push(Machine::<H>::address_to_u256(&address)),
        Err(reason) => vm.exit = Some(Exit::Abort(reason)),
    }
    Ok(())
}

/// CALL - Message-call into an account
pub fn call<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    call_inner(vm, CallScheme::Call)
}

/// CALLCODE - Message-call into this account with alternative account's code
pub fn callcode<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    call_inner(vm, CallScheme::CallCode)
}

/// DELEGATECALL - Message-call into this account with an alternative account's code, keeping
/// the current caller and value
pub fn delegatecall<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    call_inner(vm, CallScheme::DelegateCall)
}

/// STATICCALL - Static message-call into an account
pub fn staticcall<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    call_inner(vm, CallScheme::StaticCall)
}

/// Pops the operands of a call, resolves the callee frame for `scheme`, and hands it to the
/// host. The callee's output is copied to the return region and becomes the context's return
/// data.
fn call_inner<H: Host>(vm: &mut Machine<'_, H>, scheme: CallScheme) -> Result<()> {
    // gas is not metered
    vm.pop()?;
    let target = vm.pop_address()?;
    let value = match scheme {
        CallScheme::Call | CallScheme::CallCode => Some(vm.pop()?),
        CallScheme::DelegateCall | CallScheme::StaticCall => None,
    };
    let args_offset = vm.pop_usize()?;
    let args_size = vm.pop_usize()?;
    let ret_offset = vm.pop_usize()?;
    let ret_size = vm.pop_usize()?;

    let current = vm.ctx.contract.clone();
    let (address, caller, value) = match scheme {
        CallScheme::Call => (target, current.address, value.unwrap_or_default()),
        CallScheme::CallCode => (current.address, current.address, value.unwrap_or_default()),
        CallScheme::DelegateCall => (current.address, current.caller, current.value),
        CallScheme::StaticCall => (target, current.address, U256::ZERO),
    };

    let inputs = CallInputs {
        scheme,
        code_address: target,
        address,
        caller,
        value,
        input: Bytes::from(vm.ctx.memory.read(args_offset, args_size)),
    };

    match vm.host.call(inputs) {
        Ok(output) => {
            let copied = ret_size.min(output.len());
            vm.ctx.memory.copy_from(ret_offset, &output, 0, copied);
            vm.ctx.return_data = output;
            vm.push(U256::from(1u8));
        }
        Err(reason) => vm.exit = Some(Exit::Abort(reason)),
    }
    Ok(())
}

/// RETURN - Halt execution returning output data
pub fn op_return<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    let payload = vm.ctx.memory.read(offset, size);
    vm.host.record_return(&payload);
    Ok(())
}

/// REVERT - Halt execution reverting state changes
pub fn revert<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    let payload = vm.ctx.memory.read(offset, size);
    vm.host.record_return(&payload);
    Ok(())
}

/// SELFDESTRUCT - Halt execution and register account for later deletion
pub fn selfdestruct<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let beneficiary = vm.pop_address()?;
    vm.host.selfdestruct(&vm.ctx.contract, beneficiary);
    Ok(())
}
