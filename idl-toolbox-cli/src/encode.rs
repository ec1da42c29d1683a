//! Build an instruction with its addresses resolved offline.

use std::collections::HashMap;

use idl_toolbox::pda::{parse_pubkey, pubkey_to_string};
use idl_toolbox::program::IdlProgram;
use idl_toolbox::resolve::find_addresses;
use serde_json::{json, Value};
use solana_pubkey::Pubkey;
use tracing::debug;

use crate::decode::render;
use crate::error::{CliError, CliResult};

/// Encode instruction `name`.
///
/// Addresses come from `accounts` (`name=ADDRESS` pairs), fixed addresses in
/// the document, and PDAs whose seeds need only arguments and other
/// addresses. No account state is fetched.
pub async fn run(
    program: &IdlProgram,
    name: &str,
    args: &str,
    accounts: &[(String, String)],
    program_id: Option<&str>,
) -> CliResult<String> {
    let instruction = program
        .instructions
        .get(name)
        .ok_or_else(|| CliError::UnknownInstruction(name.to_string()))?;
    let program_id = match program_id {
        Some(text) => parse_pubkey(text).map_err(|e| e.wrap("--program-id"))?,
        None => program.metadata.address.ok_or(CliError::MissingProgramId)?,
    };
    let args: Value = serde_json::from_str(args).map_err(|e| CliError::input("--args", e))?;

    let mut known: HashMap<String, Pubkey> = HashMap::new();
    for (account, address) in accounts {
        let pubkey = parse_pubkey(address).map_err(|e| e.wrap(format!("--account {}", account)))?;
        known.insert(account.clone(), pubkey);
    }

    let addresses = find_addresses(instruction, &program_id, &args, &known, None).await?;
    debug!(
        instruction = %instruction.name,
        resolved = addresses.len(),
        given = known.len(),
        "addresses resolved"
    );
    let built = instruction.encode(&program_id, &addresses.into_iter().collect(), &args)?;

    let metas: Vec<Value> = instruction
        .accounts
        .iter()
        .zip(&built.accounts)
        .map(|(account, meta)| {
            json!({
                "name": account.name,
                "address": pubkey_to_string(&meta.pubkey),
                "writable": meta.is_writable,
                "signer": meta.is_signer,
            })
        })
        .collect();
    render(json!({
        "program_id": pubkey_to_string(&built.program_id),
        "accounts": metas,
        "data": hex::encode(&built.data),
    }))
}
