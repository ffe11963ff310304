use alloy::primitives::{I256, U256};
use eyre::{bail, eyre, Result};

/// Converts a signed integer into an unsigned integer
pub fn sign_uint(unsigned: U256) -> I256 {
    I256::from_raw(unsigned)
}

/// Decodes a hex string into a vector of bytes
///
/// ```
/// use tandem_common::utils::strings::decode_hex;
///
/// let hex = "48656c6c6f20576f726c64"; // "Hello World" in hex
/// let result = decode_hex(hex).expect("should decode hex");
/// assert_eq!(result, vec![72, 101, 108, 108, 111, 32, 87, 111, 114, 108, 100]);
/// ```
pub fn decode_hex(mut s: &str) -> Result<Vec<u8>> {
    // normalize
    s = s.trim().trim_start_matches("0x");

    if s.is_empty() {
        return Ok(vec![]);
    }
    if s.len() % 2 != 0 {
        bail!("invalid hex string: odd length ({})", s.len());
    }

    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| eyre!("invalid hex string: {}", s))
}

/// Encodes a U256 into a hex string, removing leading zeros
///
/// ```
/// use tandem_common::utils::strings::encode_hex_reduced;
/// use alloy::primitives::U256;
///
/// let result = encode_hex_reduced(U256::from(0x5b));
/// assert_eq!(result, "0x5b");
/// ```
pub fn encode_hex_reduced(s: U256) -> String {
    if s > U256::ZERO {
        format!("0x{s:x}")
    } else {
        String::from("0")
    }
}
