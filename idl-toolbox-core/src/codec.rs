//! Binary encoding and decoding of JSON values through a [`FullType`].
//!
//! The format is little-endian and borsh compatible for borsh types. Values
//! use JSON: 64 and 128 bit integers travel as decimal strings, pubkeys as
//! base58 strings, byte containers may also be given as byte literals.

use heck::ToSnakeCase;
use serde_json::{Map, Number, Value};

use crate::bytes::{parse_bytes, pubkey_from_str, pubkey_to_string};
use crate::error::{Context, IdlError, IdlResult};
use crate::full::{FullEnum, FullEnumVariant, FullFields, FullType};
use crate::primitive::{checked_end, read_slice, zero_fill, Prefix, Primitive};

/// Encode `value` as `full`.
///
/// With `prefixed == false` a top-level vec or string is written without its
/// length prefix, which is how seeds and raw byte arguments are framed.
/// Nested containers always carry their prefix.
pub fn encode(full: &FullType, value: &Value, prefixed: bool) -> IdlResult<Vec<u8>> {
    let mut data = vec![];
    encode_into(full, value, &mut data, prefixed)?;
    Ok(data)
}

pub fn encode_into(
    full: &FullType,
    value: &Value,
    data: &mut Vec<u8>,
    prefixed: bool,
) -> IdlResult<()> {
    match full {
        FullType::Typedef { name, content, .. } => {
            encode_into(content, value, data, prefixed).with_context(|| name.clone())
        }
        FullType::Primitive(primitive) => encode_primitive(*primitive, value, data),
        FullType::Option { prefix, content } => {
            if value.is_null() {
                return prefix.encode(0, data);
            }
            prefix.encode(1, data)?;
            encode_into(content, value, data, true)
        }
        FullType::Vec { prefix, items } => {
            if is_byte(items) {
                let bytes = byte_container(value)?;
                if prefixed {
                    prefix.encode(bytes.len() as u128, data)?;
                }
                data.extend_from_slice(&bytes);
                return Ok(());
            }
            let values = expect_array(value)?;
            if prefixed {
                prefix.encode(values.len() as u128, data)?;
            }
            for (index, item) in values.iter().enumerate() {
                encode_into(items, item, data, true).with_context(|| format!("[{}]", index))?;
            }
            Ok(())
        }
        FullType::Array { items, length } => {
            if is_byte(items) {
                let bytes = byte_container(value)?;
                check_length(*length, bytes.len())?;
                data.extend_from_slice(&bytes);
                return Ok(());
            }
            let values = expect_array(value)?;
            check_length(*length, values.len())?;
            for (index, item) in values.iter().enumerate() {
                encode_into(items, item, data, true).with_context(|| format!("[{}]", index))?;
            }
            Ok(())
        }
        FullType::String { prefix } => {
            let text = value
                .as_str()
                .ok_or_else(|| IdlError::codec(format!("expected a string, got {}", value)))?;
            if prefixed {
                prefix.encode(text.len() as u128, data)?;
            }
            data.extend_from_slice(text.as_bytes());
            Ok(())
        }
        FullType::Struct { fields } => encode_fields(fields, value, data),
        FullType::Enum(full_enum) => encode_enum(full_enum, value, data),
        FullType::Padded {
            before,
            end,
            content,
        } => {
            zero_fill(data, checked_end(data.len(), *before)?)?;
            let start = data.len();
            encode_into(content, value, data, true)?;
            let written = data.len() - start;
            if written < *end {
                zero_fill(data, checked_end(start, *end)?)?;
            }
            Ok(())
        }
        FullType::Blob { bytes } => {
            data.extend_from_slice(bytes);
            Ok(())
        }
    }
}

/// Encode a field list: an object for named fields, an array for unnamed ones.
pub fn encode_fields(fields: &FullFields, value: &Value, data: &mut Vec<u8>) -> IdlResult<()> {
    match fields {
        FullFields::Nothing => Ok(()),
        FullFields::Named(named) => {
            let object = match value {
                Value::Object(object) => Some(object),
                Value::Null => None,
                other => {
                    return Err(IdlError::codec(format!(
                        "expected an object with {} field(s), got {}",
                        named.len(),
                        other
                    )))
                }
            };
            for field in named {
                let field_value = object
                    .and_then(|object| lookup_field(object, &field.name))
                    .unwrap_or(&Value::Null);
                encode_into(&field.content, field_value, data, true)
                    .with_context(|| format!("field {}", field.name))?;
            }
            Ok(())
        }
        FullFields::Unnamed(unnamed) => {
            let single;
            let values = match value {
                Value::Array(values) => values.as_slice(),
                other if unnamed.len() == 1 => {
                    single = [other.clone()];
                    &single[..]
                }
                other => {
                    return Err(IdlError::codec(format!(
                        "expected an array of {} item(s), got {}",
                        unnamed.len(),
                        other
                    )))
                }
            };
            check_length(unnamed.len(), values.len())?;
            for (index, (field, field_value)) in unnamed.iter().zip(values).enumerate() {
                encode_into(&field.content, field_value, data, true)
                    .with_context(|| format!("field [{}]", index))?;
            }
            Ok(())
        }
    }
}

/// Decode one value of type `full` at `offset`, returning the bytes consumed.
pub fn decode(full: &FullType, data: &[u8], offset: usize) -> IdlResult<(usize, Value)> {
    match full {
        FullType::Typedef { name, content, .. } => {
            decode(content, data, offset).with_context(|| name.clone())
        }
        FullType::Primitive(primitive) => decode_primitive(*primitive, data, offset),
        FullType::Option { prefix, content } => {
            let (tag_size, tag) = prefix.decode(data, offset)?;
            match tag {
                0 => Ok((tag_size, Value::Null)),
                1 => {
                    let (size, value) = decode(content, data, offset + tag_size)?;
                    Ok((tag_size + size, value))
                }
                other => Err(IdlError::codec(format!(
                    "invalid option tag {} at offset {}",
                    other, offset
                ))),
            }
        }
        FullType::Vec { prefix, items } => {
            let (prefix_size, length) = decode_length(*prefix, data, offset)?;
            let (size, value) = decode_items(items, length, data, offset + prefix_size)?;
            Ok((prefix_size + size, value))
        }
        FullType::Array { items, length } => decode_items(items, *length, data, offset),
        FullType::String { prefix } => {
            let (prefix_size, length) = decode_length(*prefix, data, offset)?;
            let bytes = read_slice(data, offset + prefix_size, length)?;
            let text = std::str::from_utf8(bytes).map_err(|e| {
                IdlError::codec(format!("invalid utf-8 string at offset {}: {}", offset, e))
            })?;
            Ok((prefix_size + length, Value::String(text.to_string())))
        }
        FullType::Struct { fields } => decode_fields(fields, data, offset),
        FullType::Enum(full_enum) => decode_enum(full_enum, data, offset),
        FullType::Padded {
            before,
            end,
            content,
        } => {
            let start = checked_end(offset, *before)?;
            read_slice(data, offset, *before)?;
            let (size, value) = decode(content, data, start)?;
            let consumed = checked_end(*before, size.max(*end))?;
            read_slice(data, offset, consumed)?;
            Ok((consumed, value))
        }
        FullType::Blob { bytes } => {
            let found = read_slice(data, offset, bytes.len())?;
            if found != bytes.as_slice() {
                return Err(IdlError::codec(format!(
                    "blob mismatch at offset {}: expected {}, found {}",
                    offset,
                    hex::encode(bytes),
                    hex::encode(found)
                )));
            }
            Ok((bytes.len(), Value::Null))
        }
    }
}

pub fn decode_fields(fields: &FullFields, data: &[u8], offset: usize) -> IdlResult<(usize, Value)> {
    match fields {
        FullFields::Nothing => Ok((0, Value::Null)),
        FullFields::Named(named) => {
            let mut object = Map::new();
            let mut consumed = 0;
            for field in named {
                let at = offset + consumed;
                let (size, value) = decode(&field.content, data, at)
                    .with_context(|| format!("field {} (offset {})", field.name, at))?;
                consumed += size;
                object.insert(field.name.clone(), value);
            }
            Ok((consumed, Value::Object(object)))
        }
        FullFields::Unnamed(unnamed) => {
            let mut values = Vec::with_capacity(unnamed.len());
            let mut consumed = 0;
            for (index, field) in unnamed.iter().enumerate() {
                let at = offset + consumed;
                let (size, value) = decode(&field.content, data, at)
                    .with_context(|| format!("field [{}] (offset {})", index, at))?;
                consumed += size;
                values.push(value);
            }
            Ok((consumed, Value::Array(values)))
        }
    }
}

fn encode_enum(full_enum: &FullEnum, value: &Value, data: &mut Vec<u8>) -> IdlResult<()> {
    let (variant, fields_value) = match value {
        Value::Object(object) if object.len() == 1 => {
            let (key, fields_value) = object
                .iter()
                .next()
                .ok_or_else(|| IdlError::codec("empty enum object"))?;
            (find_variant(full_enum, &Value::String(key.clone()))?, fields_value)
        }
        other => (find_variant(full_enum, other)?, &Value::Null),
    };
    full_enum.prefix.encode(variant.code, data)?;
    encode_fields(&variant.fields, fields_value, data)
        .with_context(|| format!("variant {}", variant.name))
}

fn find_variant<'a>(full_enum: &'a FullEnum, key: &Value) -> IdlResult<&'a FullEnumVariant> {
    let found = match key {
        Value::String(name) => full_enum.variant_by_name(name).or_else(|| {
            name.parse::<u128>()
                .ok()
                .and_then(|code| full_enum.variant_by_code(code))
        }),
        Value::Number(number) => number
            .as_u64()
            .and_then(|code| full_enum.variant_by_code(code as u128)),
        _ => None,
    };
    found.ok_or_else(|| {
        IdlError::codec(format!(
            "unknown enum variant {}, expected one of [{}]",
            key,
            full_enum
                .variants
                .iter()
                .map(|variant| variant.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

fn decode_enum(full_enum: &FullEnum, data: &[u8], offset: usize) -> IdlResult<(usize, Value)> {
    let (prefix_size, code) = full_enum.prefix.decode(data, offset)?;
    let variant = full_enum.variant_by_code(code).ok_or_else(|| {
        IdlError::codec(format!("unknown enum code {} at offset {}", code, offset))
    })?;
    if variant.fields.is_empty() {
        return Ok((prefix_size, Value::String(variant.name.clone())));
    }
    let (size, fields) = decode_fields(&variant.fields, data, offset + prefix_size)
        .with_context(|| format!("variant {}", variant.name))?;
    let mut object = Map::new();
    object.insert(variant.name.clone(), fields);
    Ok((prefix_size + size, Value::Object(object)))
}

fn decode_items(
    items: &FullType,
    length: usize,
    data: &[u8],
    offset: usize,
) -> IdlResult<(usize, Value)> {
    if is_byte(items) {
        let bytes = read_slice(data, offset, length)?;
        return Ok((
            length,
            Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect()),
        ));
    }
    let remaining = data.len().saturating_sub(offset);
    let mut values = Vec::with_capacity(length.min(remaining));
    let mut consumed = 0;
    for index in 0..length {
        let (size, value) =
            decode(items, data, offset + consumed).with_context(|| format!("[{}]", index))?;
        consumed += size;
        values.push(value);
        if size == 0 && length > remaining {
            return Err(IdlError::codec(format!(
                "{} zero-sized items at offset {} exceed the {} remaining byte(s)",
                length, offset, remaining
            )));
        }
    }
    Ok((consumed, Value::Array(values)))
}

fn decode_length(prefix: Prefix, data: &[u8], offset: usize) -> IdlResult<(usize, usize)> {
    let (size, length) = prefix.decode(data, offset)?;
    let length = usize::try_from(length).map_err(|_| {
        IdlError::codec(format!("length {} at offset {} is too large", length, offset))
    })?;
    Ok((size, length))
}

fn lookup_field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.to_snake_case() == name)
            .map(|(_, value)| value)
    })
}

fn is_byte(full: &FullType) -> bool {
    matches!(full, FullType::Primitive(Primitive::U8))
}

fn byte_container(value: &Value) -> IdlResult<Vec<u8>> {
    match value {
        Value::Array(_) | Value::Object(_) => parse_bytes(value, &Default::default())
            .map_err(|e| IdlError::codec(format!("invalid bytes: {}", e))),
        other => Err(IdlError::codec(format!(
            "expected an array of bytes, got {}",
            other
        ))),
    }
}

fn expect_array(value: &Value) -> IdlResult<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| IdlError::codec(format!("expected an array, got {}", value)))
}

fn check_length(expected: usize, found: usize) -> IdlResult<()> {
    if expected != found {
        return Err(IdlError::codec(format!(
            "expected {} item(s), found {}",
            expected, found
        )));
    }
    Ok(())
}

fn value_to_u128(value: &Value) -> IdlResult<u128> {
    let parsed = match value {
        Value::Number(number) => number.as_u64().map(u128::from),
        Value::String(text) => text.trim().parse::<u128>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| IdlError::codec(format!("expected an unsigned integer, got {}", value)))
}

fn value_to_i128(value: &Value) -> IdlResult<i128> {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .map(i128::from)
            .or_else(|| number.as_u64().map(i128::from)),
        Value::String(text) => text.trim().parse::<i128>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| IdlError::codec(format!("expected an integer, got {}", value)))
}

fn value_to_f64(value: &Value) -> IdlResult<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| IdlError::codec(format!("expected a number, got {}", value)))
}

fn out_of_range(primitive: Primitive, value: impl std::fmt::Display) -> IdlError {
    IdlError::codec(format!("{} is out of range for {}", value, primitive))
}

macro_rules! encode_int {
    ($data:expr, $primitive:expr, $target:ty, $value:expr) => {{
        let value = $value;
        let narrowed = <$target>::try_from(value).map_err(|_| out_of_range($primitive, value))?;
        $data.extend_from_slice(&narrowed.to_le_bytes());
    }};
}

fn encode_primitive(primitive: Primitive, value: &Value, data: &mut Vec<u8>) -> IdlResult<()> {
    match primitive {
        Primitive::U8 => encode_int!(data, primitive, u8, value_to_u128(value)?),
        Primitive::U16 => encode_int!(data, primitive, u16, value_to_u128(value)?),
        Primitive::U32 => encode_int!(data, primitive, u32, value_to_u128(value)?),
        Primitive::U64 => encode_int!(data, primitive, u64, value_to_u128(value)?),
        Primitive::U128 => data.extend_from_slice(&value_to_u128(value)?.to_le_bytes()),
        Primitive::I8 => encode_int!(data, primitive, i8, value_to_i128(value)?),
        Primitive::I16 => encode_int!(data, primitive, i16, value_to_i128(value)?),
        Primitive::I32 => encode_int!(data, primitive, i32, value_to_i128(value)?),
        Primitive::I64 => encode_int!(data, primitive, i64, value_to_i128(value)?),
        Primitive::I128 => data.extend_from_slice(&value_to_i128(value)?.to_le_bytes()),
        // f32 takes the nearest representable value; only f32-exact inputs
        // decode back unchanged.
        Primitive::F32 => {
            let wide = value_to_f64(value)?;
            let narrowed = wide as f32;
            if !narrowed.is_finite() {
                return Err(out_of_range(primitive, wide));
            }
            data.extend_from_slice(&narrowed.to_le_bytes());
        }
        Primitive::F64 => {
            let wide = value_to_f64(value)?;
            if !wide.is_finite() {
                return Err(out_of_range(primitive, wide));
            }
            data.extend_from_slice(&wide.to_le_bytes());
        }
        Primitive::Bool => {
            let flag = value
                .as_bool()
                .ok_or_else(|| IdlError::codec(format!("expected a bool, got {}", value)))?;
            data.push(u8::from(flag));
        }
        Primitive::Pubkey => {
            let text = value.as_str().ok_or_else(|| {
                IdlError::codec(format!("expected a base58 pubkey, got {}", value))
            })?;
            data.extend_from_slice(&pubkey_from_str(text)?);
        }
    }
    Ok(())
}

fn float_value(value: f64) -> IdlResult<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| IdlError::codec(format!("non-finite float {}", value)))
}

fn decode_primitive(primitive: Primitive, data: &[u8], offset: usize) -> IdlResult<(usize, Value)> {
    let size = primitive.size();
    let bytes = read_slice(data, offset, size)?;
    let mut buffer = [0u8; 16];
    buffer[..size].copy_from_slice(bytes);
    let value = match primitive {
        Primitive::U8 => Value::from(bytes[0]),
        Primitive::U16 => Value::from(u16::from_le_bytes([bytes[0], bytes[1]])),
        Primitive::U32 => Value::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        Primitive::U64 => Value::String(u128::from_le_bytes(buffer).to_string()),
        Primitive::U128 => Value::String(u128::from_le_bytes(buffer).to_string()),
        Primitive::I8 => Value::from(bytes[0] as i8),
        Primitive::I16 => Value::from(i16::from_le_bytes([bytes[0], bytes[1]])),
        Primitive::I32 => Value::from(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        Primitive::I64 => {
            let mut wide = [0u8; 8];
            wide.copy_from_slice(bytes);
            Value::String(i64::from_le_bytes(wide).to_string())
        }
        Primitive::I128 => Value::String(i128::from_le_bytes(buffer).to_string()),
        Primitive::F32 => {
            float_value(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64)?
        }
        Primitive::F64 => {
            let mut wide = [0u8; 8];
            wide.copy_from_slice(bytes);
            float_value(f64::from_le_bytes(wide))?
        }
        Primitive::Bool => match bytes[0] {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            other => {
                return Err(IdlError::codec(format!(
                    "invalid bool byte {} at offset {}",
                    other, offset
                )))
            }
        },
        Primitive::Pubkey => Value::String(pubkey_to_string(bytes)),
    };
    Ok((size, value))
}
