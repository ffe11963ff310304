use alloy::primitives::{Bytes, B256};
use eyre::Result;

use super::super::{core::Machine, host::Host};

/// LOG0-LOG4 - Append log record with N topics
pub fn log_n<H: Host>(vm: &mut Machine<'_, H>, topic_count: u8) -> Result<()> {
    let offset = vm.pop_usize()?;
    let size = vm.pop_usize()?;
    let topics = vm
        .ctx
        .stack
        .pop_n(topic_count as usize)?
        .into_iter()
        .map(|topic| B256::from(topic.to_be_bytes::<32>()))
        .collect();

    let data = Bytes::from(vm.ctx.memory.read(offset, size));
    vm.host.log(&vm.ctx.contract, topics, data);
    Ok(())
}
