//! Events emitted by a program as discriminated payloads.

use idl_toolbox_core::error::{Context, IdlResult};
use idl_toolbox_core::flat::Typedefs;
use idl_toolbox_core::full::FullType;
use idl_toolbox_core::parse::parse_docs;
use serde_json::Value;

use crate::account::parse_content;
use crate::discriminator::{decode_framed, encode_framed, event_discriminator, parse_discriminator};

#[derive(Debug, Clone, PartialEq)]
pub struct IdlEvent {
    pub name: String,
    pub docs: Vec<String>,
    pub discriminator: Vec<u8>,
    pub content: FullType,
}

impl IdlEvent {
    pub fn parse(name: &str, value: &Value, typedefs: &Typedefs) -> IdlResult<Self> {
        let parsed = || -> IdlResult<Self> {
            Ok(IdlEvent {
                name: name.to_string(),
                docs: parse_docs(value.get("docs")),
                discriminator: parse_discriminator(value.get("discriminator"), typedefs, || {
                    event_discriminator(name)
                })?,
                content: parse_content(name, value, typedefs)?,
            })
        };
        parsed().with_context(|| format!("event {}", name))
    }

    pub fn encode(&self, payload: &Value) -> IdlResult<Vec<u8>> {
        encode_framed(&self.discriminator, &self.content, payload)
            .with_context(|| format!("event {}", self.name))
    }

    pub fn decode(&self, data: &[u8]) -> IdlResult<Value> {
        decode_framed(&self.discriminator, &self.content, data)
            .map(|(_, value)| value)
            .with_context(|| format!("event {}", self.name))
    }

    pub fn check(&self, data: &[u8]) -> IdlResult<()> {
        self.decode(data).map(|_| ())
    }
}
