use std::fmt;

use serde::{Deserialize, Serialize};
use tandem_common::ether::{
    provider::{ChainDataSource, ProviderError},
    types::{Block, Transaction},
};
use tandem_vm::{
    core::vm::Environment,
    ext::exec::{ExplorationConfig, Explorer},
};
use tracing::{debug, debug_span, info};

use super::transaction::TransactionResult;
use crate::error::Error;

/// The verdict for one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResult {
    /// The block number.
    pub number: u64,

    /// One result per transaction, in block order.
    pub transactions: Vec<TransactionResult>,

    /// Whether the transactions could have executed concurrently.
    pub independent: bool,
}

impl fmt::Display for BlockResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Independent execution for block #{}: {}", self.number, self.independent)?;
        write!(f, "Number of transactions: {}", self.transactions.len())
    }
}

/// The blocks analyzed by one invocation of [`analyze`](super::analyze).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    /// Block verdicts, in ascending block order.
    pub blocks: Vec<BlockResult>,
}

impl AnalyzeResult {
    /// Whether every analyzed block is independent.
    pub fn independent(&self) -> bool {
        self.blocks.iter().all(|block| block.independent)
    }
}

/// Decides whether the transactions of a block are independent, and records the conflicts of
/// each transaction.
///
/// Any incomplete transaction makes the block dependent. A block without writes is
/// independent. Otherwise transaction `j` is a conflict of transaction `i` when `i` reads an
/// address `j` writes, and the block is independent only if no transaction has a conflict.
pub fn find_conflicts(transactions: &mut [TransactionResult]) -> bool {
    if transactions.iter().any(|tx| !tx.completed) {
        return false;
    }
    if transactions.iter().all(|tx| tx.access.writes.is_empty()) {
        return true;
    }

    let writes: Vec<_> = transactions.iter().map(|tx| tx.access.writes.clone()).collect();
    for (i, tx) in transactions.iter_mut().enumerate() {
        for (j, write_set) in writes.iter().enumerate() {
            if i != j {
                tx.access.add_conflicts(j, write_set);
            }
        }
    }

    transactions.iter().all(|tx| tx.access.conflicts.is_empty())
}

/// The [`Analyzer`] drives the analysis of blocks read from a chain data source.
pub struct Analyzer<S> {
    source: S,
    explorer: Explorer,
}

impl<S: ChainDataSource> Analyzer<S> {
    /// Creates an analyzer reading blocks and committed state from `source`.
    pub fn new(source: S, config: ExplorationConfig) -> Self {
        Self { source, explorer: Explorer::new(config) }
    }

    /// The environment `tx` executes in.
    fn environment(&self, block: &Block, tx: &Transaction) -> Environment {
        Environment {
            origin: tx.from,
            gas_price: tx.gas_price,
            coinbase: block.coinbase,
            timestamp: block.timestamp,
            number: block.number,
            prevrandao: block.difficulty,
            gas_limit: block.gas_limit,
            chain_id: block.chain_id,
            base_fee: block.base_fee,
            gas_constant: self.explorer.config.gas_constant,
        }
    }

    /// Analyzes every transaction of block `number` and decides whether the block is
    /// independent.
    pub fn analyze_block(&self, number: u64) -> Result<BlockResult, Error> {
        let block = self.source.get_block(number)?;
        let committed = self.source.state_at(number)?;
        let span = debug_span!("block", number);
        let _guard = span.enter();

        debug!(transactions = block.transactions.len(), "analyzing block");

        let mut transactions = block
            .transactions
            .iter()
            .enumerate()
            .map(|(index, tx)| {
                let span = debug_span!("transaction", index);
                let _guard = span.enter();
                TransactionResult::analyze(
                    &self.source,
                    &committed,
                    &self.explorer,
                    self.environment(&block, tx),
                    tx,
                    index,
                )
            })
            .collect::<Vec<_>>();

        let independent = find_conflicts(&mut transactions);
        info!(number, independent, transactions = transactions.len(), "analyzed block");

        Ok(BlockResult { number, transactions, independent })
    }

    /// Analyzes blocks `start`, `start + 1`, ... until the data source runs out of blocks.
    ///
    /// Any data source error other than a missing block is yielded once, and ends the
    /// iteration.
    pub fn analyze_range(&self, start: u64) -> impl Iterator<Item = Result<BlockResult, Error>> + '_ {
        let mut number = start;
        let mut finished = false;

        std::iter::from_fn(move || {
            if finished {
                return None;
            }

            match self.analyze_block(number) {
                Ok(result) => {
                    number += 1;
                    Some(Ok(result))
                }
                Err(Error::ProviderError(ProviderError::NotFound(_))) => {
                    debug!(number, "no more blocks");
                    finished = true;
                    None
                }
                Err(e) => {
                    finished = true;
                    Some(Err(e))
                }
            }
        })
    }

    /// Analyzes block `start`, or every block from `start` on when `range` is set, handing each
    /// verdict to `on_block` as soon as it is decided.
    ///
    /// Returns the number of blocks delivered. A data source error ends the run after the
    /// blocks before it were delivered.
    pub fn for_each_block<F>(
        &self,
        start: u64,
        range: bool,
        mut on_block: F,
    ) -> Result<usize, Error>
    where
        F: FnMut(BlockResult) -> Result<(), Error>,
    {
        if !range {
            on_block(self.analyze_block(start)?)?;
            return Ok(1);
        }

        let mut delivered = 0;
        for result in self.analyze_range(start) {
            on_block(result?)?;
            delivered += 1;
        }
        Ok(delivered)
    }
}
