//! Byte literals and text encodings used by the IDL document layer.

use base58::{FromBase58, ToBase58};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use crate::codec::encode;
use crate::error::{Context, IdlError, IdlResult};
use crate::flat::Typedefs;
use crate::hydrate::hydrate_type;
use crate::parse::parse_flat;

/// Parse a byte literal.
///
/// Accepted forms:
/// - `[1, 2, 3]` raw bytes
/// - `"text"` UTF-8 bytes
/// - `{"base16": "..."}` (or `hex`), `{"base58": "..."}`, `{"base64": "..."}`, `{"utf8": "..."}`
/// - `{"type": T, "value": v}` the unprefixed encoding of `v` as `T`
/// - `{"value": v}` with the type inferred from `v`
pub fn parse_bytes(value: &Value, typedefs: &Typedefs) -> IdlResult<Vec<u8>> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_u64()
                    .and_then(|byte| u8::try_from(byte).ok())
                    .ok_or_else(|| {
                        IdlError::parse(format!("byte [{}] is not a u8: {}", index, item))
                    })
            })
            .collect(),
        Value::String(text) => Ok(text.as_bytes().to_vec()),
        Value::Object(object) => {
            if let Some(text) = object.get("base16").or_else(|| object.get("hex")) {
                return hex::decode(expect_str(text)?.trim_start_matches("0x"))
                    .map_err(|e| IdlError::parse(format!("invalid base16: {}", e)));
            }
            if let Some(text) = object.get("base58") {
                return expect_str(text)?
                    .from_base58()
                    .map_err(|e| IdlError::parse(format!("invalid base58: {:?}", e)));
            }
            if let Some(text) = object.get("base64") {
                return STANDARD
                    .decode(expect_str(text)?)
                    .map_err(|e| IdlError::parse(format!("invalid base64: {}", e)));
            }
            if let Some(text) = object.get("utf8") {
                return Ok(expect_str(text)?.as_bytes().to_vec());
            }
            if let Some(inner) = object.get("value") {
                return match object.get("type") {
                    Some(type_value) => {
                        let flat = parse_flat(type_value).context("bytes type")?;
                        let full = hydrate_type(&flat, &Default::default(), typedefs)
                            .context("bytes type")?;
                        encode(&full, inner, false).context("bytes value")
                    }
                    None => parse_inferred_bytes(inner),
                };
            }
            Err(IdlError::parse(format!(
                "unknown byte literal encoding: {}",
                Value::Object(object.clone())
            )))
        }
        other => Err(IdlError::parse(format!("invalid byte literal: {}", other))),
    }
}

fn parse_inferred_bytes(value: &Value) -> IdlResult<Vec<u8>> {
    match value {
        Value::Array(_) | Value::String(_) => parse_bytes(value, &Default::default()),
        Value::Bool(flag) => Ok(vec![u8::from(*flag)]),
        other => Err(IdlError::parse(format!(
            "cannot infer the type of byte value {}, add a \"type\"",
            other
        ))),
    }
}

fn expect_str(value: &Value) -> IdlResult<&str> {
    value
        .as_str()
        .ok_or_else(|| IdlError::parse(format!("expected a string, got {}", value)))
}

/// Decode a base58 address into its 32 raw bytes.
pub fn pubkey_from_str(text: &str) -> IdlResult<[u8; 32]> {
    let bytes = text
        .from_base58()
        .map_err(|e| IdlError::codec(format!("invalid pubkey '{}': {:?}", text, e)))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        IdlError::codec(format!(
            "invalid pubkey '{}': decoded to {} bytes, expected 32",
            text,
            bytes.len()
        ))
    })
}

pub fn pubkey_to_string(bytes: &[u8]) -> String {
    bytes.to_base58()
}
