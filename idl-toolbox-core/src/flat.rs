//! Flat types: the IDL schema as written in the document.
//!
//! A flat type may still reference typedefs by name and carry unresolved
//! generic symbols. The hydrator turns it into a [`crate::full::FullType`].

use indexmap::IndexMap;

use crate::primitive::{Prefix, Primitive};

/// A type as written in an IDL document.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatType {
    Defined {
        name: String,
        generics: Vec<FlatType>,
    },
    Generic {
        symbol: String,
    },
    Option {
        prefix: Prefix,
        content: Box<FlatType>,
    },
    Vec {
        prefix: Prefix,
        items: Box<FlatType>,
    },
    Array {
        items: Box<FlatType>,
        length: Box<FlatType>,
    },
    String {
        prefix: Prefix,
    },
    Struct {
        fields: FlatFields,
    },
    Enum {
        prefix: Prefix,
        variants: Vec<FlatEnumVariant>,
    },
    Padded {
        before: usize,
        end: usize,
        content: Box<FlatType>,
    },
    Blob {
        bytes: Vec<u8>,
    },
    Const {
        literal: i128,
    },
    Primitive(Primitive),
}

impl FlatType {
    pub fn defined(name: impl Into<String>) -> Self {
        FlatType::Defined {
            name: name.into(),
            generics: vec![],
        }
    }

    pub fn nothing() -> Self {
        FlatType::Struct {
            fields: FlatFields::Nothing,
        }
    }
}

/// The fields of a struct or of an enum variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlatFields {
    #[default]
    Nothing,
    Named(Vec<FlatFieldNamed>),
    Unnamed(Vec<FlatFieldUnnamed>),
}

impl FlatFields {
    pub fn len(&self) -> usize {
        match self {
            FlatFields::Nothing => 0,
            FlatFields::Named(fields) => fields.len(),
            FlatFields::Unnamed(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatFieldNamed {
    pub name: String,
    pub docs: Vec<String>,
    pub content: FlatType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatFieldUnnamed {
    pub docs: Vec<String>,
    pub content: FlatType,
}

/// An enum variant; a missing code defaults to its position when hydrated.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEnumVariant {
    pub name: String,
    pub code: Option<u128>,
    pub docs: Vec<String>,
    pub fields: FlatFields,
}

/// How the program lays a typedef out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Serialization {
    #[default]
    Borsh,
    Bytemuck,
    BytemuckUnsafe,
}

impl Serialization {
    pub fn is_bytemuck(&self) -> bool {
        matches!(self, Serialization::Bytemuck | Serialization::BytemuckUnsafe)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReprKind {
    C,
    Rust,
    Transparent,
}

/// `#[repr(...)]` attributes declared for a typedef.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    pub kind: ReprKind,
    pub packed: bool,
}

/// A named, possibly generic, type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub name: String,
    pub docs: Vec<String>,
    pub generics: Vec<String>,
    pub serialization: Serialization,
    pub repr: Option<Repr>,
    pub content: FlatType,
}

/// Typedef registry, keyed by name in declaration order.
pub type Typedefs = IndexMap<String, Typedef>;

/// Typedefs every document can reference without declaring them.
///
/// They are checked before the document's own registry.
pub fn builtin_typedef(name: &str) -> Option<Typedef> {
    let generic_t = || {
        Box::new(FlatType::Generic {
            symbol: "T".to_string(),
        })
    };
    let (generics, content) = match name {
        "Pubkey" | "PublicKey" => (vec![], FlatType::Primitive(Primitive::Pubkey)),
        "String" => (vec![], FlatType::String { prefix: Prefix::U32 }),
        "Option" => (
            vec!["T"],
            FlatType::Option {
                prefix: Prefix::U8,
                content: generic_t(),
            },
        ),
        "COption" => (
            vec!["T"],
            FlatType::Option {
                prefix: Prefix::U32,
                content: generic_t(),
            },
        ),
        "Vec" => (
            vec!["T"],
            FlatType::Vec {
                prefix: Prefix::U32,
                items: generic_t(),
            },
        ),
        "Box" => (vec!["T"], *generic_t()),
        _ => return None,
    };
    Some(Typedef {
        name: name.to_string(),
        docs: vec![],
        generics: generics.into_iter().map(String::from).collect(),
        serialization: Serialization::Borsh,
        repr: None,
        content,
    })
}
