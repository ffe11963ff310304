use clap::Parser;
use derive_builder::Builder;
use eyre::Result;
use tandem_common::ether::bytecode::get_bytecode_from_target;

/// Arguments for the CFG subcommand
#[derive(Debug, Clone, Parser, Builder)]
#[clap(
    about = "Generate a visual control flow graph for EVM bytecode",
    override_usage = "tandem cfg <TARGET> [OPTIONS]"
)]
pub struct CfgArgs {
    /// The target to generate a Cfg for, either a file or bytecode.
    #[clap(required = true)]
    pub target: String,

    /// Color the edges of the graph based on the JUMPI condition.
    /// This is useful for visualizing the flow of if statements.
    #[clap(long = "color-edges", short)]
    pub color_edges: bool,

    /// The output directory to write the output to or 'print' to print to the console
    #[clap(long = "output", short = 'o', default_value = "output", hide_default_value = true)]
    pub output: String,

    /// The name for the output file
    #[clap(long, short, default_value = "", hide_default_value = true)]
    pub name: String,
}

impl CfgArgs {
    /// Get the bytecode for the target
    pub fn get_bytecode(&self) -> Result<Vec<u8>> {
        Ok(get_bytecode_from_target(&self.target)?)
    }
}

impl CfgArgsBuilder {
    /// Create a new instance of the [`CfgArgsBuilder`]
    pub fn new() -> Self {
        Self {
            target: Some(String::new()),
            color_edges: Some(false),
            output: Some(String::new()),
            name: Some(String::new()),
        }
    }
}
