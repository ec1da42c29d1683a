//! Byte blobs computed while building an instruction: PDA seeds and the
//! program a PDA is derived from.

use idl_toolbox_core::bytes::parse_bytes;
use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::flat::{FlatType, Typedefs};
use idl_toolbox_core::full::{FullFields, FullType};
use idl_toolbox_core::hydrate::{hydrate_type, GenericBindings};
use idl_toolbox_core::parse::parse_flat;
use idl_toolbox_core::path::IdlPath;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionBlob {
    /// Bytes known when the document is parsed.
    Const { bytes: Vec<u8> },
    /// A value read from the instruction arguments.
    Arg { path: IdlPath, content: FullType },
    /// An account address, or a value read from that account's state.
    /// Without a declared type, the fetched state's type is used.
    Account {
        path: IdlPath,
        content: Option<FullType>,
    },
}

impl InstructionBlob {
    /// Parse a seed entry.
    ///
    /// Accepts `{"kind": "const" | "arg" | "account", ...}` objects, and bare
    /// byte literals as constants.
    pub fn parse(value: &Value, args: &FullFields, typedefs: &Typedefs) -> IdlResult<Self> {
        let kind = value.get("kind").and_then(Value::as_str);
        match kind {
            Some("const") => parse_const(value, typedefs),
            Some("arg") => {
                let path = parse_path(value)?;
                let content = match value.get("type") {
                    Some(declared) => hydrate_declared(declared, typedefs)?,
                    None => path.type_at_fields(args)?,
                };
                Ok(InstructionBlob::Arg { path, content })
            }
            Some("account") => {
                let path = parse_path(value)?;
                let content = match value.get("type") {
                    Some(declared) => Some(hydrate_declared(declared, typedefs)?),
                    None => account_field_type(value, &path, typedefs),
                };
                Ok(InstructionBlob::Account { path, content })
            }
            Some(other) => Err(IdlError::parse(format!("unknown blob kind '{}'", other))),
            None if value.get("value").is_some() => parse_const(value, typedefs),
            None => Ok(InstructionBlob::Const {
                bytes: parse_bytes(value, typedefs)?,
            }),
        }
    }
}

fn parse_const(value: &Value, typedefs: &Typedefs) -> IdlResult<InstructionBlob> {
    let literal = value
        .get("value")
        .ok_or_else(|| IdlError::parse("const blob is missing its value"))?;
    let bytes = match value.get("type") {
        Some(declared) => {
            let mut typed = Map::new();
            typed.insert("type".to_string(), declared.clone());
            typed.insert("value".to_string(), literal.clone());
            parse_bytes(&Value::Object(typed), typedefs)?
        }
        None => parse_bytes(literal, typedefs)?,
    };
    Ok(InstructionBlob::Const { bytes })
}

fn parse_path(value: &Value) -> IdlResult<IdlPath> {
    let text = value
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| IdlError::parse("blob is missing its path"))?;
    let path = IdlPath::parse(text)?;
    if path.is_empty() {
        return Err(IdlError::parse("blob path is empty"));
    }
    Ok(path)
}

fn hydrate_declared(declared: &Value, typedefs: &Typedefs) -> IdlResult<FullType> {
    let flat = parse_flat(declared).context("type")?;
    hydrate_type(&flat, &GenericBindings::new(), typedefs).context("type")
}

/// `{"kind": "account", "path": "vault.owner", "account": "Vault"}` names the
/// account type, which gives the field type up front. Unknown names are left
/// for the fetched state to answer.
fn account_field_type(value: &Value, path: &IdlPath, typedefs: &Typedefs) -> Option<FullType> {
    let account = value.get("account").and_then(Value::as_str)?;
    let (_, rest) = path.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let full = hydrate_type(&FlatType::defined(account), &GenericBindings::new(), typedefs).ok()?;
    rest.type_at(&full).ok()
}
