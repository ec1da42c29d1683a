//! JSON → flat type parsing.

use heck::ToSnakeCase;
use serde_json::{Map, Value};

use crate::bytes::parse_bytes;
use crate::error::{Context, IdlError, IdlResult};
use crate::flat::{
    FlatEnumVariant, FlatFieldNamed, FlatFieldUnnamed, FlatFields, FlatType, Repr, ReprKind,
    Serialization, Typedef, Typedefs,
};
use crate::primitive::{Prefix, Primitive};

const PREFIX_SUFFIXES: [&str; 5] = ["8", "16", "32", "64", "128"];

/// Parse a type node of an IDL document.
pub fn parse_flat(value: &Value) -> IdlResult<FlatType> {
    match value {
        Value::String(name) => Ok(parse_flat_name(name)),
        Value::Number(_) => Ok(FlatType::Const {
            literal: parse_const_literal(value)?,
        }),
        Value::Array(_) => Ok(FlatType::Struct {
            fields: parse_fields(value)?,
        }),
        Value::Object(object) => parse_flat_object(object),
        other => Err(IdlError::parse(format!("unsupported type node: {}", other))),
    }
}

fn parse_flat_name(name: &str) -> FlatType {
    if let Some(primitive) = Primitive::from_name(name) {
        return FlatType::Primitive(primitive);
    }
    if let Some(prefix) = sized_alias(name, "string", Prefix::U32) {
        return FlatType::String { prefix };
    }
    if let Some(prefix) = sized_alias(name, "bytes", Prefix::U32) {
        return FlatType::Vec {
            prefix,
            items: Box::new(FlatType::Primitive(Primitive::U8)),
        };
    }
    FlatType::defined(name)
}

fn sized_alias(name: &str, base: &str, default: Prefix) -> Option<Prefix> {
    let suffix = name.strip_prefix(base)?;
    if suffix.is_empty() {
        return Some(default);
    }
    Prefix::from_suffix(suffix)
}

/// Find `base` or one of its sized spellings (`base8` .. `base128`).
fn prefixed_key<'a>(
    object: &'a Map<String, Value>,
    base: &str,
    default: Prefix,
) -> Option<(Prefix, &'a Value)> {
    if let Some(value) = object.get(base) {
        return Some((default, value));
    }
    PREFIX_SUFFIXES.iter().find_map(|suffix| {
        let value = object.get(&format!("{}{}", base, suffix))?;
        Some((Prefix::from_suffix(suffix)?, value))
    })
}

fn parse_flat_object(object: &Map<String, Value>) -> IdlResult<FlatType> {
    if let Some(inner) = object.get("type").or_else(|| object.get("alias")) {
        return parse_flat(inner);
    }
    if let Some(defined) = object.get("defined") {
        return parse_defined(defined).context("defined");
    }
    if let Some(symbol) = object.get("generic") {
        let symbol = symbol
            .as_str()
            .ok_or_else(|| IdlError::parse(format!("generic symbol must be a string: {}", symbol)))?;
        return Ok(FlatType::Generic {
            symbol: symbol.to_string(),
        });
    }
    if let Some(content) = object.get("coption") {
        return Ok(FlatType::Option {
            prefix: Prefix::U32,
            content: Box::new(parse_flat(content).context("coption")?),
        });
    }
    if let Some((prefix, content)) = prefixed_key(object, "option", Prefix::U8) {
        return Ok(FlatType::Option {
            prefix,
            content: Box::new(parse_flat(content).context("option")?),
        });
    }
    if let Some((prefix, items)) = prefixed_key(object, "vec", Prefix::U32) {
        return Ok(FlatType::Vec {
            prefix,
            items: Box::new(parse_flat(items).context("vec")?),
        });
    }
    if let Some(array) = object.get("array") {
        return parse_array(array).context("array");
    }
    if let Some(fields) = object.get("fields") {
        return Ok(FlatType::Struct {
            fields: parse_fields(fields).context("fields")?,
        });
    }
    if let Some(items) = object.get("tuple") {
        return Ok(FlatType::Struct {
            fields: parse_unnamed_fields(items).context("tuple")?,
        });
    }
    if let Some((prefix, variants)) = prefixed_key(object, "variants", Prefix::U8) {
        return Ok(FlatType::Enum {
            prefix,
            variants: parse_variants(variants).context("variants")?,
        });
    }
    if let Some(padded) = object.get("padded") {
        return parse_padded(padded).context("padded");
    }
    if let Some(bytes) = object.get("bytes") {
        return Ok(FlatType::Blob {
            bytes: parse_bytes(bytes, &Typedefs::default()).context("bytes")?,
        });
    }
    if let Some(literal) = object.get("value") {
        return Ok(FlatType::Const {
            literal: parse_const_literal(literal)?,
        });
    }
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    Err(IdlError::parse(format!("unknown type keys: [{}]", keys.join(", "))))
}

fn parse_defined(value: &Value) -> IdlResult<FlatType> {
    match value {
        Value::String(name) => Ok(FlatType::defined(name.as_str())),
        Value::Object(object) => {
            let name = object
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| IdlError::parse("defined type is missing its name"))?;
            let generics = match object.get("generics") {
                Some(Value::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        parse_flat(item).with_context(|| format!("generic [{}]", index))
                    })
                    .collect::<IdlResult<Vec<_>>>()?,
                Some(other) => {
                    return Err(IdlError::parse(format!(
                        "generics must be an array: {}",
                        other
                    )))
                }
                None => vec![],
            };
            Ok(FlatType::Defined {
                name: name.to_string(),
                generics,
            })
        }
        other => Err(IdlError::parse(format!("invalid defined type: {}", other))),
    }
}

fn parse_array(value: &Value) -> IdlResult<FlatType> {
    let (items, length) = match value {
        Value::Array(parts) => match parts.as_slice() {
            [items] => (items, None),
            [items, length] => (items, Some(length)),
            _ => {
                return Err(IdlError::parse(format!(
                    "array must be [items] or [items, length], got {} entries",
                    parts.len()
                )))
            }
        },
        Value::Object(object) => {
            let items = object
                .get("items")
                .ok_or_else(|| IdlError::parse("array is missing its items"))?;
            (items, object.get("length"))
        }
        other => return Err(IdlError::parse(format!("invalid array: {}", other))),
    };
    let items = Box::new(parse_flat(items).context("items")?);
    match length {
        Some(length) => Ok(FlatType::Array {
            items,
            length: Box::new(parse_flat(length).context("length")?),
        }),
        None => Ok(FlatType::Vec {
            prefix: Prefix::U32,
            items,
        }),
    }
}

fn parse_padded(value: &Value) -> IdlResult<FlatType> {
    let object = value
        .as_object()
        .ok_or_else(|| IdlError::parse(format!("padded must be an object: {}", value)))?;
    let before = parse_usize(object.get("before"))?.unwrap_or(0);
    let end = parse_usize(object.get("end").or_else(|| object.get("min_size")))?.unwrap_or(0);
    let mut content = object.clone();
    for key in ["before", "end", "min_size"] {
        content.remove(key);
    }
    Ok(FlatType::Padded {
        before,
        end,
        content: Box::new(parse_flat(&Value::Object(content))?),
    })
}

fn parse_usize(value: Option<&Value>) -> IdlResult<Option<usize>> {
    match value {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|number| usize::try_from(number).ok())
            .map(Some)
            .ok_or_else(|| IdlError::parse(format!("expected a size, got {}", value))),
    }
}

/// Parse an integer literal given as a JSON number or a decimal string.
pub fn parse_const_literal(value: &Value) -> IdlResult<i128> {
    let literal = match value {
        Value::Number(number) => number
            .as_i64()
            .map(i128::from)
            .or_else(|| number.as_u64().map(i128::from)),
        Value::String(text) => text.trim().replace('_', "").parse::<i128>().ok(),
        _ => None,
    };
    literal.ok_or_else(|| IdlError::parse(format!("expected an integer literal, got {}", value)))
}

fn parse_code(value: &Value) -> IdlResult<u128> {
    let literal = parse_const_literal(value)?;
    u128::try_from(literal)
        .map_err(|_| IdlError::parse(format!("enum code must not be negative: {}", literal)))
}

/// Parse a field list; names make it named, otherwise it is positional.
pub fn parse_fields(value: &Value) -> IdlResult<FlatFields> {
    let items = match value {
        Value::Null => return Ok(FlatFields::Nothing),
        Value::Array(items) => items,
        other => return Err(IdlError::parse(format!("fields must be an array: {}", other))),
    };
    if items.is_empty() {
        return Ok(FlatFields::Nothing);
    }
    let named = items
        .iter()
        .any(|item| item.get("name").and_then(Value::as_str).is_some());
    if !named {
        return parse_unnamed_fields(value);
    }
    let mut fields = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .map(|name| name.to_snake_case())
            .unwrap_or_else(|| index.to_string());
        let content = parse_flat(item).with_context(|| format!("field {}", name))?;
        fields.push(FlatFieldNamed {
            name,
            docs: parse_docs(item.get("docs")),
            content,
        });
    }
    Ok(FlatFields::Named(fields))
}

fn parse_unnamed_fields(value: &Value) -> IdlResult<FlatFields> {
    let items = value
        .as_array()
        .ok_or_else(|| IdlError::parse(format!("fields must be an array: {}", value)))?;
    if items.is_empty() {
        return Ok(FlatFields::Nothing);
    }
    let fields = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Ok(FlatFieldUnnamed {
                docs: parse_docs(item.get("docs")),
                content: parse_flat(item).with_context(|| format!("field [{}]", index))?,
            })
        })
        .collect::<IdlResult<Vec<_>>>()?;
    Ok(FlatFields::Unnamed(fields))
}

fn parse_variants(value: &Value) -> IdlResult<Vec<FlatEnumVariant>> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_variant(index, item))
            .collect(),
        Value::Object(object) => object
            .iter()
            .map(|(name, code)| {
                Ok(FlatEnumVariant {
                    name: name.clone(),
                    code: Some(parse_code(code).with_context(|| format!("variant {}", name))?),
                    docs: vec![],
                    fields: FlatFields::Nothing,
                })
            })
            .collect(),
        other => Err(IdlError::parse(format!(
            "variants must be an array or an object: {}",
            other
        ))),
    }
}

fn parse_variant(index: usize, item: &Value) -> IdlResult<FlatEnumVariant> {
    match item {
        Value::Number(_) => {
            let code = parse_code(item)?;
            Ok(FlatEnumVariant {
                name: code.to_string(),
                code: Some(code),
                docs: vec![],
                fields: FlatFields::Nothing,
            })
        }
        Value::String(name) => Ok(FlatEnumVariant {
            name: name.clone(),
            code: None,
            docs: vec![],
            fields: FlatFields::Nothing,
        }),
        Value::Array(_) => Ok(FlatEnumVariant {
            name: index.to_string(),
            code: None,
            docs: vec![],
            fields: parse_fields(item).with_context(|| format!("variant [{}]", index))?,
        }),
        Value::Object(object) => {
            let code = object.get("code").map(parse_code).transpose()?;
            let name = match object.get("name").and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => code.map(|code| code.to_string()).unwrap_or_else(|| index.to_string()),
            };
            let fields = parse_fields(object.get("fields").unwrap_or(&Value::Null))
                .with_context(|| format!("variant {}", name))?;
            Ok(FlatEnumVariant {
                name,
                code,
                docs: parse_docs(object.get("docs")),
                fields,
            })
        }
        other => Err(IdlError::parse(format!("invalid enum variant: {}", other))),
    }
}

/// Docs are a string or a list of strings; anything else is dropped.
pub fn parse_docs(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(line)) => vec![line.clone()],
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => vec![],
    }
}

/// Parse one typedef entry. The content is read from the entry itself, so
/// both `{"name", "type": {...}}` and shorthand `{"fields": [...]}` work.
pub fn parse_typedef(name: &str, value: &Value) -> IdlResult<Typedef> {
    let generics = match value.get("generics") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .or_else(|| item.get("name").and_then(Value::as_str))
                    .map(String::from)
                    .ok_or_else(|| IdlError::parse(format!("invalid generic declaration: {}", item)))
            })
            .collect::<IdlResult<Vec<_>>>()?,
        _ => vec![],
    };
    let serialization = match value.get("serialization").and_then(Value::as_str) {
        None | Some("borsh") => Serialization::Borsh,
        Some("bytemuck") => Serialization::Bytemuck,
        Some("bytemuckunsafe") | Some("bytemuck_unsafe") => Serialization::BytemuckUnsafe,
        Some(other) => {
            return Err(IdlError::parse(format!("unknown serialization '{}'", other))
                .wrap(format!("typedef {}", name)))
        }
    };
    let repr = value
        .get("repr")
        .map(parse_repr)
        .transpose()
        .with_context(|| format!("typedef {}", name))?;
    let content = parse_flat(value).with_context(|| format!("typedef {}", name))?;
    Ok(Typedef {
        name: name.to_string(),
        docs: parse_docs(value.get("docs")),
        generics,
        serialization,
        repr,
        content,
    })
}

fn parse_repr(value: &Value) -> IdlResult<Repr> {
    let (kind, packed) = match value {
        Value::String(kind) => (kind.as_str(), false),
        Value::Object(object) => (
            object
                .get("kind")
                .and_then(Value::as_str)
                .ok_or_else(|| IdlError::parse("repr is missing its kind"))?,
            object.get("packed").and_then(Value::as_bool).unwrap_or(false),
        ),
        other => return Err(IdlError::parse(format!("invalid repr: {}", other))),
    };
    let kind = match kind {
        "c" | "C" => ReprKind::C,
        "rust" | "Rust" => ReprKind::Rust,
        "transparent" => ReprKind::Transparent,
        other => return Err(IdlError::parse(format!("unsupported repr '{}'", other))),
    };
    Ok(Repr { kind, packed })
}

/// Parse a typedef collection: an array of named entries or a name-keyed object.
pub fn parse_typedefs(value: &Value) -> IdlResult<Typedefs> {
    let mut typedefs = Typedefs::new();
    for (name, entry) in named_entries(value).context("types")? {
        let typedef = parse_typedef(&name, entry)?;
        typedefs.insert(name, typedef);
    }
    Ok(typedefs)
}

/// Iterate a collection given as `[{"name": ..}, ..]` or `{"name": {..}, ..}`.
pub fn named_entries(value: &Value) -> IdlResult<Vec<(String, &Value)>> {
    match value {
        Value::Null => Ok(vec![]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let name = item
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| IdlError::parse(format!("entry [{}] has no name", index)))?;
                Ok((name.to_string(), item))
            })
            .collect(),
        Value::Object(object) => Ok(object
            .iter()
            .map(|(name, item)| (name.clone(), item))
            .collect()),
        other => Err(IdlError::parse(format!(
            "expected an array or an object, got {}",
            other
        ))),
    }
}
