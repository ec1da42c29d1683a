//! Address resolution for instruction accounts.
//!
//! Accounts resolve from an explicit address, a literal address in the
//! document, or a PDA whose seeds may depend on other accounts. Resolution
//! runs in passes over the account list until a pass resolves nothing new.

use std::collections::HashMap;

use async_trait::async_trait;
use heck::{ToLowerCamelCase, ToSnakeCase};
use idl_toolbox_core::codec::encode;
use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::full::FullType;
use idl_toolbox_core::path::PathToken;
use indexmap::IndexMap;
use serde_json::Value;
use solana_pubkey::Pubkey;
use tracing::{debug, trace};

use crate::blob::InstructionBlob;
use crate::instruction::IdlInstruction;
use crate::instruction_account::{IdlInstructionAccount, IdlPda};
use crate::pda::{derive_pda, pubkey_from_bytes, pubkey_to_string};

/// A decoded account, as handed back by an [`AccountFetcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    pub content: FullType,
    pub value: Value,
}

/// Host-provided source of on-chain account states.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// `Ok(None)` when the account does not exist.
    async fn fetch_account(&self, address: &Pubkey) -> IdlResult<Option<AccountState>>;
}

/// The name as written, in lowerCamelCase and in snake_case, without repeats.
pub fn name_spellings(name: &str) -> Vec<String> {
    let mut spellings = vec![name.to_string()];
    for spelling in [name.to_lower_camel_case(), name.to_snake_case()] {
        if !spellings.contains(&spelling) {
            spellings.push(spelling);
        }
    }
    spellings
}

pub(crate) fn lookup_spellings<'a, V>(map: &'a HashMap<String, V>, name: &str) -> Option<&'a V> {
    name_spellings(name)
        .iter()
        .find_map(|spelling| map.get(spelling))
}

/// Resolve every account address `instruction` needs.
///
/// `known` holds caller-supplied addresses by account name. Unresolved
/// optional accounts are left out of the result; unresolved required ones
/// fail with a resolution error listing each account's last failure.
pub async fn find_addresses(
    instruction: &IdlInstruction,
    program_id: &Pubkey,
    args: &Value,
    known: &HashMap<String, Pubkey>,
    fetcher: Option<&dyn AccountFetcher>,
) -> IdlResult<IndexMap<String, Pubkey>> {
    let mut resolver = Resolver {
        program_id: *program_id,
        args,
        fetcher,
        states: HashMap::new(),
    };
    let mut resolved: HashMap<String, Pubkey> = HashMap::new();
    let mut failures: HashMap<String, IdlError> = HashMap::new();
    let mut pass = 0;
    loop {
        pass += 1;
        debug!(
            instruction = %instruction.name,
            pass,
            resolved = resolved.len(),
            "address resolution pass"
        );
        let mut progress = false;
        for account in &instruction.accounts {
            if resolved.contains_key(&account.name) {
                continue;
            }
            match resolver.resolve_account(account, known, &resolved).await {
                Ok(address) => {
                    trace!(account = %account.name, address = %pubkey_to_string(&address), "resolved");
                    failures.remove(&account.name);
                    resolved.insert(account.name.clone(), address);
                    progress = true;
                }
                Err(err) => {
                    trace!(account = %account.name, error = %err, "not resolved yet");
                    failures.insert(account.name.clone(), err);
                }
            }
        }
        if !progress {
            break;
        }
    }

    let unresolved: Vec<String> = instruction
        .accounts
        .iter()
        .filter(|account| !account.optional && !resolved.contains_key(&account.name))
        .map(|account| match failures.get(&account.name) {
            Some(err) => format!("{} ({})", account.name, err),
            None => account.name.clone(),
        })
        .collect();
    if !unresolved.is_empty() {
        return Err(IdlError::resolution(format!(
            "unresolved accounts after {} pass(es): {}",
            pass,
            unresolved.join("; ")
        ))
        .wrap(format!("instruction {}", instruction.name)));
    }
    Ok(instruction
        .accounts
        .iter()
        .filter_map(|account| {
            resolved
                .get(&account.name)
                .map(|address| (account.name.clone(), *address))
        })
        .collect())
}

struct Resolver<'a> {
    program_id: Pubkey,
    args: &'a Value,
    fetcher: Option<&'a dyn AccountFetcher>,
    /// Fetched states by account name, kept for the whole resolution.
    states: HashMap<String, AccountState>,
}

impl Resolver<'_> {
    async fn resolve_account(
        &mut self,
        account: &IdlInstructionAccount,
        known: &HashMap<String, Pubkey>,
        resolved: &HashMap<String, Pubkey>,
    ) -> IdlResult<Pubkey> {
        if let Some(address) = lookup_spellings(known, &account.name) {
            return Ok(*address);
        }
        if let Some(address) = account.address {
            return Ok(address);
        }
        match &account.pda {
            Some(pda) => self.resolve_pda(pda, resolved).await,
            None => Err(IdlError::resolution("no address given")),
        }
    }

    async fn resolve_pda(
        &mut self,
        pda: &IdlPda,
        resolved: &HashMap<String, Pubkey>,
    ) -> IdlResult<Pubkey> {
        let mut seeds = Vec::with_capacity(pda.seeds.len());
        for (index, seed) in pda.seeds.iter().enumerate() {
            seeds.push(
                self.evaluate(seed, resolved)
                    .await
                    .with_context(|| format!("seed [{}]", index))?,
            );
        }
        let program_id = match &pda.program {
            Some(program) => {
                let bytes = self
                    .evaluate(program, resolved)
                    .await
                    .context("pda program")?;
                pubkey_from_bytes(&bytes)?
            }
            None => self.program_id,
        };
        Ok(derive_pda(&program_id, &seeds)?.0)
    }

    /// Compute the bytes of a blob.
    async fn evaluate(
        &mut self,
        blob: &InstructionBlob,
        resolved: &HashMap<String, Pubkey>,
    ) -> IdlResult<Vec<u8>> {
        match blob {
            InstructionBlob::Const { bytes } => Ok(bytes.clone()),
            InstructionBlob::Arg { path, content } => {
                let value = path.value_at(self.args).context("args")?;
                encode(content, value, false).with_context(|| format!("arg {}", path))
            }
            InstructionBlob::Account { path, content } => {
                let Some((first, rest)) = path.split_first() else {
                    return Err(IdlError::path("empty account path"));
                };
                let name = match first {
                    PathToken::Key(name) => name.clone(),
                    other => other.to_string(),
                };
                let address = lookup_spellings(resolved, &name).copied().ok_or_else(|| {
                    IdlError::resolution(format!("account {} is not resolved yet", name))
                })?;
                if rest.is_empty() {
                    return Ok(address.as_ref().to_vec());
                }
                let state = self.account_state(&name, &address).await?;
                let value = rest
                    .value_at(&state.value)
                    .with_context(|| format!("account {}", name))?;
                let content = match content {
                    Some(content) => content.clone(),
                    None => rest
                        .type_at(&state.content)
                        .with_context(|| format!("account {}", name))?,
                };
                encode(&content, value, false).with_context(|| format!("account {}", path))
            }
        }
    }

    async fn account_state(&mut self, name: &str, address: &Pubkey) -> IdlResult<&AccountState> {
        let cached = name_spellings(name)
            .into_iter()
            .find(|spelling| self.states.contains_key(spelling));
        let key = match cached {
            Some(key) => key,
            None => {
                let fetcher = self.fetcher.ok_or_else(|| {
                    IdlError::resolution(format!(
                        "account {} must be fetched, but no fetcher is available",
                        name
                    ))
                })?;
                debug!(account = %name, address = %pubkey_to_string(address), "fetching account");
                let state = fetcher
                    .fetch_account(address)
                    .await
                    .with_context(|| format!("fetch {}", name))?
                    .ok_or_else(|| {
                        IdlError::resolution(format!(
                            "account {} ({}) does not exist",
                            name,
                            pubkey_to_string(address)
                        ))
                    })?;
                self.states.insert(name.to_string(), state);
                name.to_string()
            }
        };
        self.states
            .get(&key)
            .ok_or_else(|| IdlError::resolution(format!("account {} state missing", name)))
    }
}
