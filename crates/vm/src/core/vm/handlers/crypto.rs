use alloy::primitives::{keccak256, U256};
use eyre::Result;

use super::super::{core::Machine, host::Host};

/// SHA3 - Compute Keccak-256 hash
pub fn sha3<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;

    let data = vm.ctx.memory.read(offset, size);
    vm.push(U256::from_be_bytes(keccak256(data).0));
    Ok(())
}
