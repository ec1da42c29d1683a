//! Program-owned account layouts.

use idl_toolbox_core::bytes::parse_bytes;
use idl_toolbox_core::codec::encode;
use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::flat::{FlatType, Typedefs};
use idl_toolbox_core::full::FullType;
use idl_toolbox_core::hydrate::{hydrate_type, GenericBindings};
use idl_toolbox_core::parse::{parse_docs, parse_flat};
use idl_toolbox_core::primitive::{checked_end, read_slice, zero_fill};
use serde_json::Value;

use crate::discriminator::{
    account_discriminator, check_discriminator, decode_framed, parse_discriminator,
};

/// Keys that mark an entry as carrying its own type instead of pointing at
/// the typedef of the same name.
const INLINE_TYPE_KEYS: [&str; 4] = ["type", "fields", "variants", "tuple"];

#[derive(Debug, Clone, PartialEq)]
pub struct IdlAccount {
    pub name: String,
    pub docs: Vec<String>,
    pub discriminator: Vec<u8>,
    /// Exact data length, when the program allocates a fixed size.
    pub space: Option<usize>,
    /// Bytes asserted at fixed offsets.
    pub blobs: Vec<(usize, Vec<u8>)>,
    pub content: FullType,
}

impl IdlAccount {
    pub fn parse(name: &str, value: &Value, typedefs: &Typedefs) -> IdlResult<Self> {
        let parsed = || -> IdlResult<Self> {
            let space = match value.get("space") {
                None | Some(Value::Null) => None,
                Some(space) => Some(
                    space
                        .as_u64()
                        .and_then(|space| usize::try_from(space).ok())
                        .ok_or_else(|| IdlError::parse(format!("invalid space: {}", space)))?,
                ),
            };
            let blobs = match value.get("blobs") {
                Some(Value::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        parse_blob(item, typedefs).with_context(|| format!("blob [{}]", index))
                    })
                    .collect::<IdlResult<Vec<_>>>()?,
                _ => vec![],
            };
            Ok(IdlAccount {
                name: name.to_string(),
                docs: parse_docs(value.get("docs")),
                discriminator: parse_discriminator(value.get("discriminator"), typedefs, || {
                    account_discriminator(name)
                })?,
                space,
                blobs,
                content: parse_content(name, value, typedefs)?,
            })
        };
        parsed().with_context(|| format!("account {}", name))
    }

    /// Discriminator followed by the state, zero-filled up to `space`.
    pub fn encode(&self, state: &Value) -> IdlResult<Vec<u8>> {
        let encoded = || -> IdlResult<Vec<u8>> {
            let mut data = self.discriminator.clone();
            data.extend(encode(&self.content, state, true)?);
            if let Some(space) = self.space {
                if data.len() > space {
                    return Err(IdlError::codec(format!(
                        "encoded {} bytes, more than the account space of {}",
                        data.len(),
                        space
                    )));
                }
                zero_fill(&mut data, space)?;
            }
            for (offset, bytes) in &self.blobs {
                let end = checked_end(*offset, bytes.len())
                    .with_context(|| format!("blob at offset {}", offset))?;
                if data.len() < end {
                    zero_fill(&mut data, end)?;
                }
                data[*offset..end].copy_from_slice(bytes);
            }
            Ok(data)
        };
        encoded().with_context(|| format!("account {}", self.name))
    }

    pub fn decode(&self, data: &[u8]) -> IdlResult<Value> {
        let decoded = || -> IdlResult<Value> {
            self.check_constraints(data)?;
            Ok(decode_framed(&self.discriminator, &self.content, data)?.1)
        };
        decoded().with_context(|| format!("account {}", self.name))
    }

    /// Whether `data` looks like this account: size, discriminator, blobs
    /// and a decodable body.
    pub fn check(&self, data: &[u8]) -> IdlResult<()> {
        self.decode(data).map(|_| ())
    }

    fn check_constraints(&self, data: &[u8]) -> IdlResult<()> {
        if let Some(space) = self.space {
            if data.len() != space {
                return Err(IdlError::codec(format!(
                    "expected {} bytes of account data, found {}",
                    space,
                    data.len()
                )));
            }
        }
        check_discriminator(&self.discriminator, data)?;
        for (offset, bytes) in &self.blobs {
            let found = read_slice(data, *offset, bytes.len())?;
            if found != bytes.as_slice() {
                return Err(IdlError::codec(format!(
                    "blob mismatch at offset {}",
                    offset
                )));
            }
        }
        Ok(())
    }
}

/// The inline type of an account or event entry, or its same-named typedef.
pub(crate) fn parse_content(name: &str, value: &Value, typedefs: &Typedefs) -> IdlResult<FullType> {
    let inline = INLINE_TYPE_KEYS.iter().any(|key| value.get(key).is_some());
    let flat = if inline {
        parse_flat(value)?
    } else {
        FlatType::defined(name)
    };
    hydrate_type(&flat, &GenericBindings::new(), typedefs)
}

fn parse_blob(value: &Value, typedefs: &Typedefs) -> IdlResult<(usize, Vec<u8>)> {
    let offset = value
        .get("offset")
        .and_then(Value::as_u64)
        .and_then(|offset| usize::try_from(offset).ok())
        .ok_or_else(|| IdlError::parse("blob is missing its offset"))?;
    let bytes = value
        .get("value")
        .ok_or_else(|| IdlError::parse("blob is missing its value"))?;
    Ok((offset, parse_bytes(bytes, typedefs)?))
}
