use alloy::primitives::U256;
use eyre::Result;

use super::super::{core::Machine, host::Host};

/// COINBASE - Get the block's beneficiary address
pub fn coinbase<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let coinbase = vm.host.env().coinbase;
    vm.push(Machine::<H>::address_to_u256(&coinbase));
    Ok(())
}

/// TIMESTAMP - Get the block's timestamp
pub fn timestamp<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let timestamp = vm.host.env().timestamp;
    vm.push(U256::from(timestamp));
    Ok(())
}

/// NUMBER - Get the block's number
pub fn number<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let number = vm.host.env().number;
    vm.push(U256::from(number));
    Ok(())
}

/// PREVRANDAO - Get the block's difficulty or randomness beacon
pub fn prevrandao<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let prevrandao = vm.host.env().prevrandao;
    vm.push(prevrandao);
    Ok(())
}

/// GASLIMIT - Get the block's gas limit
pub fn gaslimit<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let gas_limit = vm.host.env().gas_limit;
    vm.push(U256::from(gas_limit));
    Ok(())
}

/// CHAINID - Get the chain id
pub fn chainid<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let chain_id = vm.host.env().chain_id;
    vm.push(U256::from(chain_id));
    Ok(())
}

/// SELFBALANCE - Get balance of currently executing account
pub fn selfbalance<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let balance = vm.host.self_balance(&vm.ctx.contract);
    vm.push(balance);
    Ok(())
}

/// BASEFEE - Get the block's base fee
pub fn basefee<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    let base_fee = vm.host.env().base_fee;
    vm.push(base_fee);
    Ok(())
}

/// BLOBHASH - Get a versioned blob hash. Blobs are not modelled, so this is always zero.
pub fn blobhash<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    vm.pop()?;
    vm.push(U256::ZERO);
    Ok(())
}

/// BLOBBASEFEE - Get the blob base fee. Always zero.
pub fn blobbasefee<H: Host>(vm: &mut Machine<'_, H>) -> Result<()> {
    vm.push(U256::ZERO);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::super::test_utils::{execute_with, TestHost};
    use alloy::primitives::{Address, U256};

    #[test]
    fn test_block_values_come_from_environment() {
        let mut host = TestHost::default();
        host.env.number = 17_000_000;
        host.env.timestamp = 1_700_000_000;
        host.env.coinbase = Address::repeat_byte(0x11);
        host.env.chain_id = 5;

        // NUMBER, TIMESTAMP, COINBASE, CHAINID
        let (_, ctx) = execute_with(&[0x43, 0x42, 0x41, 0x46], &mut host);
        assert_eq!(ctx.stack.peek(0), U256::from(5));
        assert_eq!(ctx.stack.peek(1), U256::from_be_slice(&[0x11; 20]));
        assert_eq!(ctx.stack.peek(2), U256::from(1_700_000_000u64));
        assert_eq!(ctx.stack.peek(3), U256::from(17_000_000u64));
    }

    #[test]
    fn test_blobhash_consumes_index() {
        // PUSH1 1, BLOBHASH
        let (_, ctx) = execute_with(&[0x60, 0x01, 0x49], &mut TestHost::default());
        assert_eq!(ctx.stack.size(), 1);
        assert_eq!(ctx.stack.peek(0), U256::ZERO);
    }
}
