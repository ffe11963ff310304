pub(crate) mod access;
pub(crate) mod block;
pub(crate) mod host;
pub(crate) mod registry;
pub(crate) mod state;
pub(crate) mod transaction;

use std::time::Instant;

use tandem_common::ether::snapshot::ChainSnapshot;
use tandem_config::Configuration;
use tracing::{debug, info};

use crate::{error::Error, interfaces::AnalyzeArgs};
use block::{AnalyzeResult, Analyzer, BlockResult};

/// Analyzes the block, or the range of blocks starting at it, named by `args`.
pub fn analyze(args: AnalyzeArgs) -> Result<AnalyzeResult, Error> {
    let config = Configuration::load()?;
    analyze_with(args, &config)
}

/// [`analyze`] against an explicit configuration.
pub fn analyze_with(args: AnalyzeArgs, config: &Configuration) -> Result<AnalyzeResult, Error> {
    let mut blocks = Vec::new();
    analyze_each(args, config, |block| {
        blocks.push(block);
        Ok(())
    })?;
    Ok(AnalyzeResult { blocks })
}

/// Analyzes the block, or the range of blocks starting at it, named by `args`, handing each
/// verdict to `on_block` as soon as the block is done.
///
/// Returns the number of blocks delivered.
pub fn analyze_each<F>(
    args: AnalyzeArgs,
    config: &Configuration,
    on_block: F,
) -> Result<usize, Error>
where
    F: FnMut(BlockResult) -> Result<(), Error>,
{
    let start_time = Instant::now();

    let path = args.snapshot_path(config)?;
    let snapshot = ChainSnapshot::from_file(&path)?;
    debug!("loaded snapshot '{}' in {:?}", path, start_time.elapsed());

    let analyzer = Analyzer::new(snapshot, args.exploration_config(config));
    let count = analyzer.for_each_block(args.block, args.range, on_block)?;

    info!("analyzed {} block(s) in {:?}", count, start_time.elapsed());
    Ok(count)
}
