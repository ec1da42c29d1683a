use idl_toolbox_core::codec::encode;
use idl_toolbox_core::error::{Context, IdlError, IdlResult};
use idl_toolbox_core::flat::Typedefs;
use idl_toolbox_core::full::FullType;
use idl_toolbox_core::hydrate::{hydrate_type, GenericBindings};
use idl_toolbox_core::parse::{parse_docs, parse_flat};
use serde_json::Value;

/// A named constant. The value is kept as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct IdlConstant {
    pub name: String,
    pub docs: Vec<String>,
    pub content: FullType,
    pub value: Value,
}

impl IdlConstant {
    pub fn parse(name: &str, value: &Value, typedefs: &Typedefs) -> IdlResult<Self> {
        let parsed = || -> IdlResult<Self> {
            let declared = value
                .get("type")
                .ok_or_else(|| IdlError::parse("constant is missing its type"))?;
            let flat = parse_flat(declared)?;
            Ok(IdlConstant {
                name: name.to_string(),
                docs: parse_docs(value.get("docs")),
                content: hydrate_type(&flat, &GenericBindings::new(), typedefs)?,
                value: value.get("value").cloned().unwrap_or(Value::Null),
            })
        };
        parsed().with_context(|| format!("constant {}", name))
    }

    /// The constant's bytes, e.g. to use it as a seed.
    pub fn encode(&self) -> IdlResult<Vec<u8>> {
        encode(&self.content, &self.value, false).with_context(|| format!("constant {}", self.name))
    }
}
