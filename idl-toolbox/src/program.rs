//! A whole program document.

use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::flat::Typedefs;
use idl_toolbox_core::parse::{named_entries, parse_docs, parse_typedefs};
use indexmap::IndexMap;
use serde_json::Value;
use solana_pubkey::Pubkey;
use tracing::{debug, trace};

use crate::account::IdlAccount;
use crate::constant::IdlConstant;
use crate::event::IdlEvent;
use crate::instruction::IdlInstruction;
use crate::pda::parse_pubkey;
use crate::program_error::IdlProgramError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdlProgramMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub address: Option<Pubkey>,
    pub spec: Option<String>,
    pub description: Option<String>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdlProgram {
    pub metadata: IdlProgramMetadata,
    pub typedefs: Typedefs,
    pub accounts: IndexMap<String, IdlAccount>,
    pub instructions: IndexMap<String, IdlInstruction>,
    pub events: IndexMap<String, IdlEvent>,
    pub errors: IndexMap<String, IdlProgramError>,
    pub constants: IndexMap<String, IdlConstant>,
}

impl IdlProgram {
    pub fn from_json(text: &str) -> IdlResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| IdlError::parse(format!("invalid json: {}", e)))?;
        Self::parse(&value)
    }

    pub fn parse(value: &Value) -> IdlResult<Self> {
        let metadata = parse_metadata(value)?;
        let typedefs = parse_typedefs(value.get("types").unwrap_or(&Value::Null))?;

        let mut accounts = IndexMap::new();
        for (name, entry) in entries(value, "accounts")? {
            accounts.insert(name.clone(), IdlAccount::parse(&name, entry, &typedefs)?);
        }
        let mut instructions = IndexMap::new();
        for (name, entry) in entries(value, "instructions")? {
            instructions.insert(name.clone(), IdlInstruction::parse(&name, entry, &typedefs)?);
        }
        let mut events = IndexMap::new();
        for (name, entry) in entries(value, "events")? {
            events.insert(name.clone(), IdlEvent::parse(&name, entry, &typedefs)?);
        }
        let mut errors = IndexMap::new();
        for (name, entry) in entries(value, "errors")? {
            errors.insert(name.clone(), IdlProgramError::parse(&name, entry)?);
        }
        let mut constants = IndexMap::new();
        for (name, entry) in entries(value, "constants")? {
            constants.insert(name.clone(), IdlConstant::parse(&name, entry, &typedefs)?);
        }

        debug!(
            program = metadata.name.as_deref().unwrap_or("<unnamed>"),
            types = typedefs.len(),
            accounts = accounts.len(),
            instructions = instructions.len(),
            events = events.len(),
            errors = errors.len(),
            constants = constants.len(),
            "parsed program"
        );
        Ok(IdlProgram {
            metadata,
            typedefs,
            accounts,
            instructions,
            events,
            errors,
            constants,
        })
    }

    /// The first account whose checks accept `data`, in declaration order.
    pub fn guess_account(&self, data: &[u8]) -> IdlResult<&IdlAccount> {
        guess("account", &self.accounts, |account| account.check(data))
    }

    pub fn guess_instruction(&self, data: &[u8]) -> IdlResult<&IdlInstruction> {
        guess("instruction", &self.instructions, |instruction| {
            instruction.check_data(data)
        })
    }

    pub fn guess_event(&self, data: &[u8]) -> IdlResult<&IdlEvent> {
        guess("event", &self.events, |event| event.check(data))
    }

    pub fn guess_error(&self, code: u32) -> Option<&IdlProgramError> {
        self.errors.values().find(|error| error.code == code)
    }
}

fn guess<'a, T>(
    kind: &str,
    candidates: &'a IndexMap<String, T>,
    check: impl Fn(&T) -> IdlResult<()>,
) -> IdlResult<&'a T> {
    let mut attempts = Vec::with_capacity(candidates.len());
    for (name, candidate) in candidates {
        match check(candidate) {
            Ok(()) => return Ok(candidate),
            Err(err) => {
                trace!(kind, candidate = %name, error = %err, "candidate rejected");
                attempts.push((name.clone(), err));
            }
        }
    }
    Err(IdlError::NoMatch {
        kind: kind.to_string(),
        attempts,
    })
}

fn entries<'a>(value: &'a Value, key: &str) -> IdlResult<Vec<(String, &'a Value)>> {
    named_entries(value.get(key).unwrap_or(&Value::Null)).context(key)
}

fn parse_metadata(value: &Value) -> IdlResult<IdlProgramMetadata> {
    let nested = value.get("metadata");
    let text = |key: &str| {
        value
            .get(key)
            .or_else(|| nested.and_then(|nested| nested.get(key)))
            .and_then(Value::as_str)
            .map(String::from)
    };
    let address = match text("address") {
        Some(address) => Some(parse_pubkey(&address).context("program address")?),
        None => None,
    };
    Ok(IdlProgramMetadata {
        name: text("name"),
        version: text("version"),
        address,
        spec: text("spec"),
        description: text("description"),
        docs: parse_docs(value.get("docs")),
    })
}
