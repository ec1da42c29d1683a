//! Fixed-width scalar types and length/discriminant prefixes.

use std::fmt;

use crate::error::{IdlError, IdlResult};

/// A fixed-size scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    Bool,
    Pubkey,
}

impl Primitive {
    /// Look up a primitive by its IDL spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "u8" => Primitive::U8,
            "u16" => Primitive::U16,
            "u32" => Primitive::U32,
            "u64" => Primitive::U64,
            "u128" => Primitive::U128,
            "i8" => Primitive::I8,
            "i16" => Primitive::I16,
            "i32" => Primitive::I32,
            "i64" => Primitive::I64,
            "i128" => Primitive::I128,
            "f32" => Primitive::F32,
            "f64" => Primitive::F64,
            "bool" => Primitive::Bool,
            "pubkey" | "publicKey" | "Pubkey" => Primitive::Pubkey,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::I128 => "i128",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Bool => "bool",
            Primitive::Pubkey => "pubkey",
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Primitive::U8 | Primitive::I8 | Primitive::Bool => 1,
            Primitive::U16 | Primitive::I16 => 2,
            Primitive::U32 | Primitive::I32 | Primitive::F32 => 4,
            Primitive::U64 | Primitive::I64 | Primitive::F64 => 8,
            Primitive::U128 | Primitive::I128 => 16,
            Primitive::Pubkey => 32,
        }
    }

    pub fn alignment(&self) -> usize {
        match self {
            Primitive::Pubkey => 1,
            other => other.size(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Width of the little-endian integer written before a length or a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    U8,
    U16,
    U32,
    U64,
    U128,
}

impl Prefix {
    /// Parse the numeric suffix of keys like `vec16` or `variants32`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "8" => Some(Prefix::U8),
            "16" => Some(Prefix::U16),
            "32" => Some(Prefix::U32),
            "64" => Some(Prefix::U64),
            "128" => Some(Prefix::U128),
            _ => None,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Prefix::U8 => 1,
            Prefix::U16 => 2,
            Prefix::U32 => 4,
            Prefix::U64 => 8,
            Prefix::U128 => 16,
        }
    }

    /// Largest value representable in this prefix.
    pub fn max_value(&self) -> u128 {
        match self {
            Prefix::U128 => u128::MAX,
            other => (1u128 << (other.size() * 8)) - 1,
        }
    }

    pub fn encode(&self, value: u128, data: &mut Vec<u8>) -> IdlResult<()> {
        if value > self.max_value() {
            return Err(IdlError::codec(format!(
                "prefix value {} does not fit in {} byte(s)",
                value,
                self.size()
            )));
        }
        data.extend_from_slice(&value.to_le_bytes()[..self.size()]);
        Ok(())
    }

    /// Read the prefix at `offset`, returning the value and its width.
    pub fn decode(&self, data: &[u8], offset: usize) -> IdlResult<(usize, u128)> {
        let bytes = read_slice(data, offset, self.size())?;
        let mut buffer = [0u8; 16];
        buffer[..bytes.len()].copy_from_slice(bytes);
        Ok((self.size(), u128::from_le_bytes(buffer)))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.size() * 8)
    }
}

/// `offset + len`, failing instead of wrapping on offsets taken from a document.
pub fn checked_end(offset: usize, len: usize) -> IdlResult<usize> {
    offset.checked_add(len).ok_or_else(|| {
        IdlError::codec(format!("offset {} plus {} byte(s) overflows", offset, len))
    })
}

/// Zero-fill `data` up to `len` bytes, failing instead of aborting on sizes
/// that cannot be allocated.
pub fn zero_fill(data: &mut Vec<u8>, len: usize) -> IdlResult<()> {
    data.try_reserve(len.saturating_sub(data.len()))
        .map_err(|e| IdlError::codec(format!("cannot allocate {} bytes: {}", len, e)))?;
    data.resize(len, 0);
    Ok(())
}

/// Borrow `len` bytes at `offset`, failing with a codec error when short.
pub fn read_slice(data: &[u8], offset: usize, len: usize) -> IdlResult<&[u8]> {
    let end = offset.checked_add(len).filter(|end| *end <= data.len());
    match end {
        Some(end) => Ok(&data[offset..end]),
        None => Err(IdlError::codec(format!(
            "need {} byte(s) at offset {}, only {} available",
            len,
            offset,
            data.len().saturating_sub(offset)
        ))),
    }
}
