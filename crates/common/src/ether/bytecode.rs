use crate::{utils::strings::decode_hex, Error};
use std::fs;
use tracing::error;

/// Whether `s` is an even-length hex string, with or without a `0x` prefix.
fn is_bytecode(s: &str) -> bool {
    let digits = s.trim_start_matches("0x");
    !digits.is_empty() && digits.len() % 2 == 0 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Given a target, determines whether it is bytecode or a file path, and returns the bytecode for
/// the target.
pub fn get_bytecode_from_target(target: &str) -> Result<Vec<u8>, Error> {
    if is_bytecode(target) {
        return Ok(decode_hex(target)?);
    }

    // Target is a file path, so we need to read the bytecode from the file.
    let contents = fs::read_to_string(target).map_err(|e| {
        error!("failed to open file '{}' .", &target);
        Error::FilesystemError(e)
    })?;

    let contents = contents.trim().replace('\n', "");
    if is_bytecode(&contents) {
        Ok(decode_hex(&contents)?)
    } else {
        error!("file '{}' doesn't contain valid bytecode.", &target);
        Err(Error::ParseError(format!("file '{}' doesn't contain valid bytecode.", &target)))
    }
}
