//! Raw bytes given on the command line.

use base58::FromBase58;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{CliError, CliResult};

/// Decode `base58:...`, `base64:...` or hex text (with or without `0x`).
pub fn decode_data(input: &str) -> CliResult<Vec<u8>> {
    let input = input.trim();
    if let Some(text) = input.strip_prefix("base58:") {
        return text
            .from_base58()
            .map_err(|e| CliError::input("base58 data", format!("{:?}", e)));
    }
    if let Some(text) = input.strip_prefix("base64:") {
        return STANDARD
            .decode(text)
            .map_err(|e| CliError::input("base64 data", e));
    }
    let hex_text = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    hex::decode(hex_text).map_err(|e| CliError::input("hex data", e))
}
