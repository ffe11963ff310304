use std::fmt;

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use tandem_common::ether::{
    provider::{ChainDataSource, StateReader},
    types::Transaction,
};
use tandem_vm::{
    core::vm::{AbortReason, Environment},
    ext::exec::Explorer,
};
use tracing::{debug, warn};

use super::{
    access::{AccessPoint, AccessSet},
    host::{FrameRecord, TransactionHost},
};

/// The outcome of analyzing one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// The transaction's index in its block.
    pub index: usize,

    /// Whether every path was explored.
    pub completed: bool,

    /// Why the analysis was abandoned, when it was.
    #[serde(skip)]
    pub abort: Option<AbortReason>,

    /// The addresses read and written, and the conflicts found by the block check.
    pub access: AccessSet,

    /// Whether a SELFDESTRUCT is reachable.
    pub suicide: bool,

    /// Distinct RETURN and REVERT payloads per level.
    pub returns: Vec<(usize, Vec<Bytes>)>,

    /// Created addresses per level.
    pub created: Vec<(usize, Address)>,

    /// De-duplicated state accesses.
    pub access_points: Vec<AccessPoint>,

    /// Explored frames, when block recording is on.
    pub frames: Vec<FrameRecord>,
}

impl TransactionResult {
    /// Analyzes `tx`, the `index`th transaction of the block described by `env`, against the
    /// block's `committed` state.
    pub(crate) fn analyze<C: ChainDataSource, R: StateReader>(
        chain: &C,
        committed: &R,
        explorer: &Explorer,
        env: Environment,
        tx: &Transaction,
        index: usize,
    ) -> Self {
        let mut host = TransactionHost::new(chain, committed, explorer, env);
        let abort = host.execute(tx).err();

        match &abort {
            Some(reason) => warn!(index, %reason, "transaction analysis aborted"),
            None => debug!(
                index,
                reads = host.access.reads.len(),
                writes = host.access.writes.len(),
                "transaction analysis completed"
            ),
        }

        Self {
            index,
            completed: abort.is_none(),
            abort,
            access: host.access,
            suicide: host.suicide,
            returns: host.returns.snapshot(),
            created: host.creates.snapshot(),
            access_points: host.points,
            frames: host.frames,
        }
    }

    /// Renders the access points report of this transaction.
    pub fn report(&self, block: u64) -> String {
        let mut report = format!(
            "block number: {block}, txn index: {}, frames: {}\n",
            self.index,
            self.frames.len()
        );
        for point in &self.access_points {
            report.push_str("----\n");
            report.push_str(&point.to_string());
            report.push('\n');
        }
        report
    }
}

impl fmt::Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**** transaction: {} ****", self.index)?;
        write!(f, "{}", self.access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_common::ether::snapshot::{AccountState, ChainSnapshot};

    const CONTRACT: Address = Address::repeat_byte(0xc0);

    fn analyze(code: &'static [u8]) -> TransactionResult {
        let source = ChainSnapshot::new().with_account(
            CONTRACT,
            AccountState { code: Bytes::from_static(code), ..Default::default() },
        );
        let tx = Transaction { to: Some(CONTRACT), ..Default::default() };
        let explorer = Explorer::default();
        TransactionResult::analyze(&source, &source, &explorer, Environment::default(), &tx, 2)
    }

    #[test]
    fn test_completed_transaction() {
        // PUSH0, SLOAD, STOP
        let result = analyze(&[0x5f, 0x54, 0x00]);

        assert!(result.completed);
        assert_eq!(result.abort, None);
        assert_eq!(result.index, 2);
        assert!(result.access.reads.contains(&CONTRACT));
        assert_eq!(result.access_points.len(), 1);
        assert!(!result.suicide);
    }

    #[test]
    fn test_failure_aborts_transaction() {
        // ADD on an empty stack
        let result = analyze(&[0x01]);

        assert!(!result.completed);
        assert!(matches!(result.abort, Some(AbortReason::Failure { pc: 0, .. })));
    }

    #[test]
    fn test_report_lists_access_points() {
        // PUSH0, SLOAD, PUSH0, SSTORE
        let result = analyze(&[0x5f, 0x54, 0x5f, 0x55]);
        let report = result.report(7);

        assert!(report.starts_with("block number: 7, txn index: 2"));
        assert_eq!(report.matches("----").count(), 2);
        assert!(report.contains("opcode: SLOAD"));
        assert!(report.contains("opcode: SSTORE"));
        assert_eq!(result.access.writes.len(), 1);
        assert_eq!(result.returns, Vec::<(usize, Vec<Bytes>)>::new());
    }
}
