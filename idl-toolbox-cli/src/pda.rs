//! Program address derivation from command-line seeds.

use idl_toolbox::pda::{derive_pda, parse_pubkey, pubkey_to_string};
use idl_toolbox_core::bytes::parse_bytes;
use idl_toolbox_core::error::{Context, IdlResult};
use idl_toolbox_core::flat::Typedefs;
use serde_json::Value;

use crate::error::CliResult;

pub fn run(program_id: &str, seeds: &[String]) -> CliResult<String> {
    let program_id = parse_pubkey(program_id).context("--program-id")?;
    let seeds = seeds
        .iter()
        .enumerate()
        .map(|(index, seed)| seed_bytes(seed).with_context(|| format!("seed [{}]", index)))
        .collect::<IdlResult<Vec<_>>>()?;
    let (address, bump) = derive_pda(&program_id, &seeds)?;
    Ok(format!("{} (bump {})", pubkey_to_string(&address), bump))
}

/// A seed given as a JSON byte literal (`[1,2]`, `{"base58": ...}`, `"text"`),
/// or as bare utf8 text.
pub fn seed_bytes(text: &str) -> IdlResult<Vec<u8>> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Array(_) | Value::Object(_) | Value::String(_))) => {
            parse_bytes(&value, &Typedefs::new())
        }
        _ => Ok(text.as_bytes().to_vec()),
    }
}
