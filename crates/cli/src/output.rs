use std::{env, io::Write};

use colored::Colorize;
use eyre::{eyre, Result};
use tandem_core::tandem_analyze::BlockResult;

/// build a standardized output path for the given parameters. follows the following cases:
/// - if `output` is the default value (`output`), return `{cwd}/output/{filename}`
/// - if `output` is specified, return `/{output}/{filename}`
pub fn build_output_path(output: &str, filename: &str) -> Result<String> {
    // if output is the default value, build a path under the working directory
    if output == "output" {
        let cwd = env::current_dir()?
            .into_os_string()
            .into_string()
            .map_err(|_| eyre!("Unable to get current working directory"))?;

        return Ok(format!("{cwd}/output/{filename}"));
    }

    // output is specified, return the path
    Ok(format!("{output}/{filename}"))
}

/// The file name of the control-flow graph of one explored frame.
pub fn frame_filename(block: u64, transaction: usize, frame: usize) -> String {
    format!("block-{block}-tx-{transaction}-frame-{frame}.dot")
}

/// Renders the verdict of a block, followed by the access sets of its transactions when
/// `show_sets` is set.
pub fn render_block(result: &BlockResult, show_sets: bool) -> String {
    let verdict = if result.independent {
        "true".bright_green().bold()
    } else {
        "false".bright_red().bold()
    };

    let mut output = format!(
        "Independent execution for block #{}: {}\nNumber of transactions: {}\n",
        result.number,
        verdict,
        result.transactions.len()
    );

    if show_sets {
        for tx in &result.transactions {
            output.push_str(&format!("{tx}\n"));
        }
    }

    output
}

/// pass the input to the `less` command
pub fn print_with_less(input: &str) -> Result<()> {
    let mut child =
        std::process::Command::new("less").stdin(std::process::Stdio::piped()).spawn()?;

    let stdin = child.stdin.as_mut().ok_or_else(|| eyre!("unable to get stdin for less"))?;
    stdin.write_all(input.as_bytes())?;

    child.wait()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_default() {
        let path = build_output_path("output", "cfg.dot").expect("failed to build output path");
        assert!(path.ends_with("/output/cfg.dot"));
    }

    #[test]
    fn test_output_specified() {
        let path = build_output_path("/some_dir", "cfg.dot");
        assert_eq!(path.expect("failed to build output path"), "/some_dir/cfg.dot".to_string());
    }

    #[test]
    fn test_frame_filename() {
        assert_eq!(frame_filename(17, 2, 0), "block-17-tx-2-frame-0.dot");
    }

    #[test]
    fn test_render_block() {
        colored::control::set_override(false);
        let result = BlockResult { number: 5, transactions: Vec::new(), independent: true };

        assert_eq!(
            render_block(&result, true),
            "Independent execution for block #5: true\nNumber of transactions: 0\n"
        );
    }
}
