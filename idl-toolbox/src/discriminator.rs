//! Leading tags that tell payloads of one program apart.

use heck::ToSnakeCase;
use idl_toolbox_core::bytes::parse_bytes;
use idl_toolbox_core::codec::{decode, encode_into};
use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::flat::Typedefs;
use idl_toolbox_core::full::FullType;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const DISCRIMINATOR_SIZE: usize = 8;

/// First 8 bytes of `sha256("<namespace>:<name>")`.
pub fn discriminator(namespace: &str, name: &str) -> Vec<u8> {
    let hash = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    hash[..DISCRIMINATOR_SIZE].to_vec()
}

pub fn account_discriminator(name: &str) -> Vec<u8> {
    discriminator("account", name)
}

pub fn event_discriminator(name: &str) -> Vec<u8> {
    discriminator("event", name)
}

/// Instructions hash their snake_case name under the `global` namespace.
pub fn instruction_discriminator(name: &str) -> Vec<u8> {
    discriminator("global", &name.to_snake_case())
}

/// An explicit `discriminator` byte literal, or the computed default.
pub fn parse_discriminator(
    value: Option<&Value>,
    typedefs: &Typedefs,
    default: impl FnOnce() -> Vec<u8>,
) -> IdlResult<Vec<u8>> {
    match value {
        Some(literal) => parse_bytes(literal, typedefs).context("discriminator"),
        None => Ok(default()),
    }
}

pub(crate) fn check_discriminator(discriminator: &[u8], data: &[u8]) -> IdlResult<()> {
    if !data.starts_with(discriminator) {
        let found = &data[..discriminator.len().min(data.len())];
        return Err(IdlError::codec(format!(
            "discriminator mismatch: expected {}, found {}",
            hex::encode(discriminator),
            hex::encode(found)
        )));
    }
    Ok(())
}

/// `[discriminator][content]`.
pub(crate) fn encode_framed(
    discriminator: &[u8],
    content: &FullType,
    value: &Value,
) -> IdlResult<Vec<u8>> {
    let mut data = discriminator.to_vec();
    encode_into(content, value, &mut data, true)?;
    Ok(data)
}

/// Check the tag and decode the content behind it; returns the end offset.
pub(crate) fn decode_framed(
    discriminator: &[u8],
    content: &FullType,
    data: &[u8],
) -> IdlResult<(usize, Value)> {
    check_discriminator(discriminator, data)?;
    let (size, value) = decode(content, data, discriminator.len())?;
    Ok((discriminator.len() + size, value))
}
