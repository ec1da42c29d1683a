//! Dotted paths into types and values, e.g. `config.authorities[2].key`.

use std::fmt;

use heck::ToSnakeCase;
use serde_json::Value;

use crate::error::{IdlError, IdlResult};
use crate::full::{FullFields, FullType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    /// `[]`: any item of a vec or array.
    Empty,
    Index(u64),
    Key(String),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Empty => f.write_str("[]"),
            PathToken::Index(index) => write!(f, "[{}]", index),
            PathToken::Key(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IdlPath {
    pub tokens: Vec<PathToken>,
}

impl IdlPath {
    /// Parse `a.b[2].c`. Numeric dot segments are indexes too, so `a.2`
    /// and `a[2]` are the same path.
    pub fn parse(text: &str) -> IdlResult<IdlPath> {
        let mut tokens = vec![];
        for segment in text.split('.') {
            if segment.is_empty() {
                if text.is_empty() {
                    break;
                }
                return Err(IdlError::path(format!("empty segment in path '{}'", text)));
            }
            let (head, mut rest) = match segment.find('[') {
                Some(position) => segment.split_at(position),
                None => (segment, ""),
            };
            if !head.is_empty() {
                tokens.push(segment_token(head));
            }
            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| {
                    IdlError::path(format!("unclosed '[' in path '{}'", text))
                })?;
                let inner = &rest[1..close];
                tokens.push(if inner.is_empty() {
                    PathToken::Empty
                } else {
                    segment_token(inner)
                });
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(IdlError::path(format!(
                        "unexpected '{}' after ']' in path '{}'",
                        rest, text
                    )));
                }
            }
        }
        Ok(IdlPath { tokens })
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Split off the first token, typically an account or argument name.
    pub fn split_first(&self) -> Option<(&PathToken, IdlPath)> {
        self.tokens.split_first().map(|(first, rest)| {
            (
                first,
                IdlPath {
                    tokens: rest.to_vec(),
                },
            )
        })
    }

    /// The type found by following this path from `full`.
    pub fn type_at(&self, full: &FullType) -> IdlResult<FullType> {
        type_at(&self.tokens, full).map_err(|e| e.wrap(format!("path {}", self)))
    }

    /// Like [`IdlPath::type_at`], starting from a field list.
    pub fn type_at_fields(&self, fields: &FullFields) -> IdlResult<FullType> {
        type_at_fields(&self.tokens, fields).map_err(|e| e.wrap(format!("path {}", self)))
    }

    /// The value found by following this path from `value`.
    pub fn value_at<'a>(&self, value: &'a Value) -> IdlResult<&'a Value> {
        let mut current = value;
        for token in &self.tokens {
            current = match (token, current) {
                (PathToken::Index(index), Value::Array(items)) => usize::try_from(*index)
                    .ok()
                    .and_then(|index| items.get(index))
                    .ok_or_else(|| {
                        IdlError::path(format!(
                            "index {} out of bounds (length {}) in path {}",
                            index,
                            items.len(),
                            self
                        ))
                    })?,
                (PathToken::Key(key), Value::Object(object)) => object.get(key).ok_or_else(|| {
                    IdlError::path(format!("missing key '{}' in path {}", key, self))
                })?,
                (PathToken::Index(index), Value::Object(object)) => {
                    object.get(&index.to_string()).ok_or_else(|| {
                        IdlError::path(format!("missing key '{}' in path {}", index, self))
                    })?
                }
                (token, other) => {
                    return Err(IdlError::path(format!(
                        "cannot follow '{}' into {} in path {}",
                        token, other, self
                    )))
                }
            };
        }
        Ok(current)
    }
}

impl fmt::Display for IdlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, token) in self.tokens.iter().enumerate() {
            if index > 0 && matches!(token, PathToken::Key(_)) {
                f.write_str(".")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

fn segment_token(segment: &str) -> PathToken {
    match segment.parse::<u64>() {
        Ok(index) => PathToken::Index(index),
        Err(_) => PathToken::Key(segment.to_string()),
    }
}

fn type_at(tokens: &[PathToken], full: &FullType) -> IdlResult<FullType> {
    let Some((token, rest)) = tokens.split_first() else {
        return Ok(full.clone());
    };
    match full {
        FullType::Typedef { content, .. }
        | FullType::Padded { content, .. }
        | FullType::Option { content, .. } => type_at(tokens, content),
        FullType::Struct { fields } => type_at_fields(tokens, fields),
        FullType::Enum(full_enum) => {
            let variant = match token {
                PathToken::Key(name) => full_enum.variant_by_name(name),
                PathToken::Index(code) => full_enum.variant_by_code(u128::from(*code)),
                PathToken::Empty => None,
            }
            .ok_or_else(|| IdlError::path(format!("no enum variant '{}'", token)))?;
            type_at_fields(rest, &variant.fields)
        }
        FullType::Vec { items, .. } | FullType::Array { items, .. } => match token {
            PathToken::Empty | PathToken::Index(_) => type_at(rest, items),
            PathToken::Key(key) => Err(IdlError::path(format!(
                "cannot use key '{}' on {}",
                key,
                full.describe()
            ))),
        },
        other => Err(IdlError::path(format!(
            "cannot follow '{}' into {}",
            token,
            other.describe()
        ))),
    }
}

fn type_at_fields(tokens: &[PathToken], fields: &FullFields) -> IdlResult<FullType> {
    let Some((token, rest)) = tokens.split_first() else {
        return Ok(FullType::Struct {
            fields: fields.clone(),
        });
    };
    let content = match (fields, token) {
        (FullFields::Named(named), PathToken::Key(key)) => {
            let normalized = key.to_snake_case();
            named
                .iter()
                .find(|field| field.name == *key || field.name == normalized)
                .map(|field| &field.content)
        }
        (FullFields::Named(named), PathToken::Index(index)) => {
            let key = index.to_string();
            named
                .iter()
                .find(|field| field.name == key)
                .map(|field| &field.content)
        }
        (FullFields::Unnamed(unnamed), PathToken::Index(index)) => usize::try_from(*index)
            .ok()
            .and_then(|index| unnamed.get(index))
            .map(|field| &field.content),
        _ => None,
    };
    let content = content.ok_or_else(|| IdlError::path(format!("no field '{}'", token)))?;
    type_at(rest, content)
}
