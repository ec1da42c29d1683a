//! Full types: flat types with every generic and typedef resolved.

use std::collections::HashMap;

use crate::flat::Repr;
use crate::primitive::{Prefix, Primitive};

/// A fully resolved type, ready for the codec and the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FullType {
    /// A resolved typedef. `layout` is set when the typedef is bytemuck,
    /// in which case `content` already carries explicit padding.
    Typedef {
        name: String,
        repr: Option<Repr>,
        layout: Option<LayoutInfo>,
        content: Box<FullType>,
    },
    Option {
        prefix: Prefix,
        content: Box<FullType>,
    },
    Vec {
        prefix: Prefix,
        items: Box<FullType>,
    },
    Array {
        items: Box<FullType>,
        length: usize,
    },
    String {
        prefix: Prefix,
    },
    Struct {
        fields: FullFields,
    },
    Enum(FullEnum),
    Padded {
        before: usize,
        end: usize,
        content: Box<FullType>,
    },
    Blob {
        bytes: Vec<u8>,
    },
    Primitive(Primitive),
}

impl FullType {
    pub fn nothing() -> Self {
        FullType::Struct {
            fields: FullFields::Nothing,
        }
    }

    /// Short human label used in error messages.
    pub fn describe(&self) -> String {
        match self {
            FullType::Typedef { name, .. } => name.clone(),
            FullType::Option { content, .. } => format!("option<{}>", content.describe()),
            FullType::Vec { items, .. } => format!("vec<{}>", items.describe()),
            FullType::Array { items, length } => format!("[{}; {}]", items.describe(), length),
            FullType::String { .. } => "string".to_string(),
            FullType::Struct { .. } => "struct".to_string(),
            FullType::Enum(_) => "enum".to_string(),
            FullType::Padded { content, .. } => content.describe(),
            FullType::Blob { bytes } => format!("blob({} bytes)", bytes.len()),
            FullType::Primitive(primitive) => primitive.to_string(),
        }
    }
}

/// Alignment and size of a type in its native memory image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInfo {
    pub alignment: usize,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FullFields {
    #[default]
    Nothing,
    Named(Vec<FullFieldNamed>),
    Unnamed(Vec<FullFieldUnnamed>),
}

impl FullFields {
    pub fn len(&self) -> usize {
        match self {
            FullFields::Nothing => 0,
            FullFields::Named(fields) => fields.len(),
            FullFields::Unnamed(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field contents in declaration order.
    pub fn contents(&self) -> Vec<&FullType> {
        match self {
            FullFields::Nothing => vec![],
            FullFields::Named(fields) => fields.iter().map(|field| &field.content).collect(),
            FullFields::Unnamed(fields) => fields.iter().map(|field| &field.content).collect(),
        }
    }

    /// Rebuild the same field list with new contents, in order.
    pub fn with_contents(&self, contents: Vec<FullType>) -> FullFields {
        match self {
            FullFields::Nothing => FullFields::Nothing,
            FullFields::Named(fields) => FullFields::Named(
                fields
                    .iter()
                    .zip(contents)
                    .map(|(field, content)| FullFieldNamed {
                        name: field.name.clone(),
                        content,
                    })
                    .collect(),
            ),
            FullFields::Unnamed(_) => FullFields::Unnamed(
                contents
                    .into_iter()
                    .map(|content| FullFieldUnnamed { content })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullFieldNamed {
    pub name: String,
    pub content: FullType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullFieldUnnamed {
    pub content: FullType,
}

/// An enum with its lookup tables.
///
/// `variants` is sorted ascending by code; both indexes point into it.
#[derive(Debug, Clone, PartialEq)]
pub struct FullEnum {
    pub prefix: Prefix,
    pub mask: u128,
    pub variants: Vec<FullEnumVariant>,
    pub index_by_name: HashMap<String, usize>,
    pub index_by_code: HashMap<u128, usize>,
}

impl FullEnum {
    pub fn variant_by_name(&self, name: &str) -> Option<&FullEnumVariant> {
        self.index_by_name.get(name).map(|index| &self.variants[*index])
    }

    pub fn variant_by_code(&self, code: u128) -> Option<&FullEnumVariant> {
        self.index_by_code.get(&code).map(|index| &self.variants[*index])
    }

    /// Rebuild with new variant fields, keeping codes and indexes.
    pub fn with_variant_fields(&self, fields: Vec<FullFields>) -> FullEnum {
        FullEnum {
            prefix: self.prefix,
            mask: self.mask,
            variants: self
                .variants
                .iter()
                .zip(fields)
                .map(|(variant, fields)| FullEnumVariant {
                    name: variant.name.clone(),
                    code: variant.code,
                    fields,
                })
                .collect(),
            index_by_name: self.index_by_name.clone(),
            index_by_code: self.index_by_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullEnumVariant {
    pub name: String,
    pub code: u128,
    pub fields: FullFields,
}

/// Result of hydrating any flat node: a type, or a compile-time constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydrated {
    Type(FullType),
    Const(i128),
}
