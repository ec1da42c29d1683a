//! Accounts an instruction expects, and how to find their addresses.

use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::flat::Typedefs;
use idl_toolbox_core::full::FullFields;
use idl_toolbox_core::parse::parse_docs;
use serde_json::Value;
use solana_pubkey::Pubkey;

use crate::blob::InstructionBlob;
use crate::pda::parse_pubkey;

#[derive(Debug, Clone, PartialEq)]
pub struct IdlInstructionAccount {
    pub name: String,
    pub docs: Vec<String>,
    pub writable: bool,
    pub signer: bool,
    pub optional: bool,
    /// Fixed address declared in the document.
    pub address: Option<Pubkey>,
    pub pda: Option<IdlPda>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdlPda {
    pub seeds: Vec<InstructionBlob>,
    /// Owning program; the instruction's program when absent.
    pub program: Option<InstructionBlob>,
}

/// Parse an instruction's account list, flattening nested groups.
pub fn parse_instruction_accounts(
    value: &Value,
    args: &FullFields,
    typedefs: &Typedefs,
) -> IdlResult<Vec<IdlInstructionAccount>> {
    let mut accounts = vec![];
    collect_accounts(value, args, typedefs, &mut accounts)?;
    Ok(accounts)
}

fn collect_accounts(
    value: &Value,
    args: &FullFields,
    typedefs: &Typedefs,
    accounts: &mut Vec<IdlInstructionAccount>,
) -> IdlResult<()> {
    let items = match value {
        Value::Null => return Ok(()),
        Value::Array(items) => items,
        other => {
            return Err(IdlError::parse(format!(
                "instruction accounts must be an array: {}",
                other
            )))
        }
    };
    for (index, item) in items.iter().enumerate() {
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| IdlError::parse(format!("account [{}] has no name", index)))?;
        if let Some(group) = item.get("accounts") {
            collect_accounts(group, args, typedefs, accounts)
                .with_context(|| format!("group {}", name))?;
            continue;
        }
        let account = parse_instruction_account(name, item, args, typedefs)
            .with_context(|| format!("account {}", name))?;
        accounts.push(account);
    }
    Ok(())
}

fn flag(value: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .any(|key| value.get(key).and_then(Value::as_bool).unwrap_or(false))
}

fn parse_instruction_account(
    name: &str,
    value: &Value,
    args: &FullFields,
    typedefs: &Typedefs,
) -> IdlResult<IdlInstructionAccount> {
    let address = match value.get("address").and_then(Value::as_str) {
        Some(text) => Some(parse_pubkey(text).context("address")?),
        None => None,
    };
    let pda = match value.get("pda") {
        Some(pda) => Some(parse_pda(pda, args, typedefs).context("pda")?),
        None => None,
    };
    Ok(IdlInstructionAccount {
        name: name.to_string(),
        docs: parse_docs(value.get("docs")),
        writable: flag(value, &["writable", "isMut"]),
        signer: flag(value, &["signer", "isSigner"]),
        optional: flag(value, &["optional", "isOptional"]),
        address,
        pda,
    })
}

fn parse_pda(value: &Value, args: &FullFields, typedefs: &Typedefs) -> IdlResult<IdlPda> {
    let seeds = match value.get("seeds") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                InstructionBlob::parse(item, args, typedefs)
                    .with_context(|| format!("seed [{}]", index))
            })
            .collect::<IdlResult<Vec<_>>>()?,
        Some(other) => return Err(IdlError::parse(format!("seeds must be an array: {}", other))),
        None => vec![],
    };
    let program = match value.get("program") {
        Some(program) => Some(InstructionBlob::parse(program, args, typedefs).context("program")?),
        None => None,
    };
    Ok(IdlPda { seeds, program })
}
