pub(crate) mod error;
pub(crate) mod log_args;
pub(crate) mod output;

use error::Error;
use log_args::{ColorMode, LogArgs};
use output::{build_output_path, frame_filename, print_with_less, render_block};
use petgraph::Graph;
use tracing::{debug, info};

use clap::{Parser, Subcommand};

use tandem_common::utils::io::file::write_file;
use tandem_config::{config, ConfigArgs, Configuration};
use tandem_core::{
    error::Error as CoreError,
    tandem_analyze::{analyze_each, AnalyzeArgs, BlockResult},
    tandem_cfg::{build_cfg, cfg, CfgArgs, CfgResult},
};

#[derive(Debug, Parser)]
#[clap(name = "tandem", version)]
pub struct Arguments {
    #[clap(subcommand)]
    pub sub: Subcommands,

    #[clap(flatten)]
    logs: LogArgs,
}

#[derive(Debug, Subcommand)]
#[clap(
    about = "tandem decides whether the transactions of an EVM block could have executed concurrently."
)]
#[allow(clippy::large_enum_variant)]
pub enum Subcommands {
    #[clap(
        name = "analyze",
        about = "Decide whether the transactions of a block can execute independently"
    )]
    Analyze(AnalyzeArgs),

    #[clap(name = "cfg", about = "Generate a visual control flow graph for EVM bytecode")]
    Cfg(CfgArgs),

    #[clap(name = "config", about = "Display and edit the current configuration")]
    Config(ConfigArgs),
}

/// Writes the control-flow graph of every explored frame of `block` under `dir`.
fn write_frame_graphs(dir: &str, block: &BlockResult) -> Result<(), Error> {
    for tx in &block.transactions {
        for (index, frame) in tx.frames.iter().enumerate() {
            let mut graph = Graph::new();
            build_cfg(&frame.code, &frame.records, &mut graph)
                .map_err(|e| Error::Generic(format!("failed to build cfg: {}", e)))?;

            let output_path =
                build_output_path(dir, &frame_filename(block.number, tx.index, index))
                    .map_err(|e| Error::Generic(format!("failed to build output path: {}", e)))?;
            write_file(&output_path, &CfgResult { graph }.as_dot(false))
                .map_err(|e| Error::Generic(format!("failed to write cfg: {}", e)))?;
            debug!(level = frame.level, address = %frame.address, "wrote {}", output_path);
        }
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    let args = Arguments::parse();

    // setup logging
    let _guard = args.logs.init_tracing();
    if args.logs.color == ColorMode::Never {
        colored::control::set_override(false);
    }

    match args.sub {
        Subcommands::Analyze(cmd) => {
            let config = Configuration::load()
                .map_err(|e| Error::Generic(format!("failed to load configuration: {}", e)))?;
            let mut independent = 0;

            let count = analyze_each(cmd.clone(), &config, |block| {
                // independent blocks list what each transaction touched
                let show_sets = block.independent && block.transactions.len() > 1;
                print!("{}", render_block(&block, show_sets));

                if cmd.report {
                    for tx in &block.transactions {
                        print!("{}", tx.report(block.number));
                    }
                }

                if !cmd.cfg_output.is_empty() {
                    write_frame_graphs(&cmd.cfg_output, &block)
                        .map_err(|e| eyre::eyre!("failed to write cfg output: {}", e))?;
                }

                independent += usize::from(block.independent);
                Ok(())
            })
            .map_err(CoreError::from)?;

            if count > 1 {
                info!("{} of {} blocks are independent", independent, count);
            }
        }

        Subcommands::Cfg(cmd) => {
            // if the user has passed an output filename, override the default filename
            let mut filename = "cfg.dot".to_string();
            let given_name = cmd.name.as_str();

            if !given_name.is_empty() {
                filename = format!("{}-{}", given_name, filename);
            }

            let result = cfg(cmd.clone()).map_err(CoreError::from)?;
            let stringified_dot = result.as_dot(cmd.color_edges);

            if cmd.output == "print" {
                print_with_less(&stringified_dot)
                    .map_err(|e| Error::Generic(format!("failed to print cfg: {}", e)))?;
            } else {
                let output_path = build_output_path(&cmd.output, &filename)
                    .map_err(|e| Error::Generic(format!("failed to build output path: {}", e)))?;
                write_file(&output_path, &stringified_dot)
                    .map_err(|e| Error::Generic(format!("failed to write cfg: {}", e)))?;
                info!("wrote cfg to {}", output_path);
            }
        }

        Subcommands::Config(cmd) => {
            config(cmd).map_err(|e| Error::Generic(format!("failed to configure: {}", e)))?;
        }
    }

    Ok(())
}
