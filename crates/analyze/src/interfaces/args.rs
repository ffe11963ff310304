use clap::Parser;
use derive_builder::Builder;
use tandem_config::Configuration;
use tandem_vm::ext::exec::ExplorationConfig;

use crate::error::Error;

/// Arguments for the analyze subcommand
#[derive(Debug, Clone, Parser, Builder)]
#[clap(
    about = "Decide whether the transactions of a block can execute independently",
    override_usage = "tandem analyze --snapshot <FILE> --block <NUMBER> [OPTIONS]"
)]
pub struct AnalyzeArgs {
    /// The chain snapshot to read blocks and committed state from. Falls back to the
    /// configured `snapshot_path`.
    #[clap(long, short, default_value = "", hide_default_value = true)]
    pub snapshot: String,

    /// The block to analyze, or the first block of the range.
    #[clap(long, short, default_value = "0")]
    pub block: u64,

    /// Keep analyzing subsequent blocks until the snapshot runs out.
    #[clap(long, short)]
    pub range: bool,

    /// Print the access points of every transaction.
    #[clap(long)]
    pub report: bool,

    /// The directory to write one DOT graph per explored frame to.
    #[clap(long = "cfg-output", default_value = "", hide_default_value = true)]
    pub cfg_output: String,

    /// Override the configured loop iteration cap.
    #[clap(long = "loop-cap")]
    pub loop_iteration_cap: Option<usize>,

    /// Override the configured maximum call depth.
    #[clap(long = "max-depth")]
    pub max_call_depth: Option<usize>,

    /// Abandon a transaction on an invalid opcode instead of ending the branch.
    #[clap(long = "strict-invalid")]
    pub strict_invalid: bool,
}

impl AnalyzeArgs {
    /// The snapshot path, falling back to the configured one.
    pub fn snapshot_path(&self, config: &Configuration) -> Result<String, Error> {
        if !self.snapshot.is_empty() {
            return Ok(self.snapshot.clone());
        }
        if !config.snapshot_path.is_empty() {
            return Ok(config.snapshot_path.clone());
        }
        Err(eyre::eyre!("no snapshot given and no `snapshot_path` configured").into())
    }

    /// The exploration limits: the configuration with this command's overrides applied.
    pub fn exploration_config(&self, config: &Configuration) -> ExplorationConfig {
        let mut exploration = config.exploration_config();
        if let Some(cap) = self.loop_iteration_cap {
            exploration.loop_iteration_cap = cap;
        }
        if let Some(depth) = self.max_call_depth {
            exploration.max_call_depth = depth;
        }
        exploration.strict_invalid |= self.strict_invalid;
        exploration.record_blocks = !self.cfg_output.is_empty();
        exploration
    }
}

impl AnalyzeArgsBuilder {
    /// Create a new instance of the [`AnalyzeArgsBuilder`]
    pub fn new() -> Self {
        Self {
            snapshot: Some(String::new()),
            block: Some(0),
            range: Some(false),
            report: Some(false),
            cfg_output: Some(String::new()),
            loop_iteration_cap: Some(None),
            max_call_depth: Some(None),
            strict_invalid: Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_over_configuration() {
        let args = AnalyzeArgsBuilder::new()
            .loop_iteration_cap(Some(10))
            .cfg_output("graphs".to_string())
            .build()
            .expect("failed to build args");
        let config = Configuration { max_call_depth: 2, ..Default::default() };

        let exploration = args.exploration_config(&config);
        assert_eq!(exploration.loop_iteration_cap, 10);
        assert_eq!(exploration.max_call_depth, 2);
        assert!(exploration.record_blocks);
        assert!(!exploration.strict_invalid);
    }

    #[test]
    fn test_snapshot_path_falls_back_to_configuration() {
        let args = AnalyzeArgsBuilder::new().build().expect("failed to build args");

        let config = Configuration { snapshot_path: "chain.json".to_string(), ..Default::default() };
        assert_eq!(args.snapshot_path(&config).expect("no snapshot path"), "chain.json");
        assert!(args.snapshot_path(&Configuration::default()).is_err());
    }
}
