//! Instructions: argument payloads and the account list that goes with them.

use std::collections::HashMap;

use idl_toolbox_core::codec::{decode_fields, encode_fields};
use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::flat::Typedefs;
use idl_toolbox_core::full::{FullFields, FullType};
use idl_toolbox_core::hydrate::{hydrate_fields, hydrate_type, GenericBindings};
use idl_toolbox_core::parse::{parse_docs, parse_fields, parse_flat};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use solana_instruction::{AccountMeta, Instruction};
use solana_pubkey::Pubkey;

use crate::discriminator::{check_discriminator, instruction_discriminator, parse_discriminator};
use crate::instruction_account::{parse_instruction_accounts, IdlInstructionAccount};
use crate::resolve::lookup_spellings;

#[derive(Debug, Clone, PartialEq)]
pub struct IdlInstruction {
    pub name: String,
    pub docs: Vec<String>,
    pub discriminator: Vec<u8>,
    pub accounts: Vec<IdlInstructionAccount>,
    pub args: FullFields,
    pub returns: Option<FullType>,
}

impl IdlInstruction {
    pub fn parse(name: &str, value: &Value, typedefs: &Typedefs) -> IdlResult<Self> {
        let parsed = || -> IdlResult<Self> {
            let bindings = GenericBindings::new();
            let args = parse_fields(value.get("args").unwrap_or(&Value::Null)).context("args")?;
            let args = hydrate_fields(&args, &bindings, typedefs).context("args")?;
            let returns = match value.get("returns") {
                None | Some(Value::Null) => None,
                Some(returns) => {
                    let flat = parse_flat(returns).context("returns")?;
                    Some(hydrate_type(&flat, &bindings, typedefs).context("returns")?)
                }
            };
            let accounts = parse_instruction_accounts(
                value.get("accounts").unwrap_or(&Value::Null),
                &args,
                typedefs,
            )?;
            Ok(IdlInstruction {
                name: name.to_string(),
                docs: parse_docs(value.get("docs")),
                discriminator: parse_discriminator(value.get("discriminator"), typedefs, || {
                    instruction_discriminator(name)
                })?,
                accounts,
                args,
                returns,
            })
        };
        parsed().with_context(|| format!("instruction {}", name))
    }

    pub fn account(&self, name: &str) -> Option<&IdlInstructionAccount> {
        self.accounts.iter().find(|account| account.name == name)
    }

    /// Discriminator followed by the encoded arguments.
    pub fn encode_data(&self, args: &Value) -> IdlResult<Vec<u8>> {
        let mut data = self.discriminator.clone();
        encode_fields(&self.args, args, &mut data)
            .with_context(|| format!("instruction {}", self.name))?;
        Ok(data)
    }

    /// Decode the arguments; an instruction without arguments gives `{}`.
    pub fn decode_data(&self, data: &[u8]) -> IdlResult<Value> {
        let decoded = || -> IdlResult<Value> {
            check_discriminator(&self.discriminator, data)?;
            let (_, args) = decode_fields(&self.args, data, self.discriminator.len())?;
            Ok(match args {
                Value::Null => Value::Object(Map::new()),
                args => args,
            })
        };
        decoded().with_context(|| format!("instruction {}", self.name))
    }

    pub fn check_data(&self, data: &[u8]) -> IdlResult<()> {
        self.decode_data(data).map(|_| ())
    }

    /// Build the instruction from resolved addresses and arguments.
    ///
    /// Addresses are looked up by account name in any spelling. A missing
    /// optional account is passed as the program id.
    pub fn encode(
        &self,
        program_id: &Pubkey,
        addresses: &HashMap<String, Pubkey>,
        args: &Value,
    ) -> IdlResult<Instruction> {
        let mut metas = Vec::with_capacity(self.accounts.len());
        for account in &self.accounts {
            let pubkey = match lookup_spellings(addresses, &account.name) {
                Some(pubkey) => *pubkey,
                None if account.optional => *program_id,
                None => {
                    return Err(IdlError::resolution(format!(
                        "missing address for account {}",
                        account.name
                    ))
                    .wrap(format!("instruction {}", self.name)))
                }
            };
            metas.push(if account.writable {
                AccountMeta::new(pubkey, account.signer)
            } else {
                AccountMeta::new_readonly(pubkey, account.signer)
            });
        }
        Ok(Instruction {
            program_id: *program_id,
            accounts: metas,
            data: self.encode_data(args)?,
        })
    }

    /// Name the instruction's accounts and decode its arguments.
    ///
    /// Optional accounts passed as the program id are left out; accounts past
    /// the declared list are ignored.
    pub fn decode(&self, instruction: &Instruction) -> IdlResult<(IndexMap<String, Pubkey>, Value)> {
        if instruction.accounts.len() < self.accounts.len() {
            let required = self.accounts.iter().filter(|account| !account.optional).count();
            if instruction.accounts.len() < required {
                return Err(IdlError::codec(format!(
                    "expected at least {} accounts, found {}",
                    required,
                    instruction.accounts.len()
                ))
                .wrap(format!("instruction {}", self.name)));
            }
        }
        let mut addresses = IndexMap::new();
        for (account, meta) in self.accounts.iter().zip(&instruction.accounts) {
            if account.optional && meta.pubkey == instruction.program_id {
                continue;
            }
            addresses.insert(account.name.clone(), meta.pubkey);
        }
        Ok((addresses, self.decode_data(&instruction.data)?))
    }
}
