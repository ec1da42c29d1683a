//! Flat → full type resolution.
//!
//! Hydration substitutes generic bindings, expands typedef references, gives
//! enum variants their numeric codes and runs the layout engine on typedefs
//! declared as bytemuck.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{Context, IdlError, IdlResult};
use crate::flat::{builtin_typedef, FlatEnumVariant, FlatFields, FlatType, Typedef, Typedefs};
use crate::full::{
    FullEnum, FullEnumVariant, FullFieldNamed, FullFieldUnnamed, FullFields, FullType, Hydrated,
    LayoutInfo,
};
use crate::layout::layout_typedef;
use crate::primitive::Prefix;

/// Generic symbol → hydrated binding.
pub type GenericBindings = HashMap<String, Hydrated>;

/// Hydrate any flat node; constants come back as [`Hydrated::Const`].
pub fn hydrate(
    flat: &FlatType,
    bindings: &GenericBindings,
    typedefs: &Typedefs,
) -> IdlResult<Hydrated> {
    Hydrator::new(typedefs).hydrate(flat, bindings)
}

/// Hydrate a node that must be a type.
pub fn hydrate_type(
    flat: &FlatType,
    bindings: &GenericBindings,
    typedefs: &Typedefs,
) -> IdlResult<FullType> {
    Hydrator::new(typedefs).hydrate_type(flat, bindings)
}

pub fn hydrate_fields(
    fields: &FlatFields,
    bindings: &GenericBindings,
    typedefs: &Typedefs,
) -> IdlResult<FullFields> {
    Hydrator::new(typedefs).hydrate_fields(fields, bindings)
}

struct Hydrator<'a> {
    typedefs: &'a Typedefs,
    /// Typedefs currently being expanded, to reject self-reference.
    expanding: Vec<String>,
}

impl<'a> Hydrator<'a> {
    fn new(typedefs: &'a Typedefs) -> Self {
        Self {
            typedefs,
            expanding: vec![],
        }
    }

    fn hydrate_type(&mut self, flat: &FlatType, bindings: &GenericBindings) -> IdlResult<FullType> {
        match self.hydrate(flat, bindings)? {
            Hydrated::Type(full) => Ok(full),
            Hydrated::Const(literal) => Err(IdlError::hydration(format!(
                "expected a type, found const literal {}",
                literal
            ))),
        }
    }

    fn hydrate(&mut self, flat: &FlatType, bindings: &GenericBindings) -> IdlResult<Hydrated> {
        let full = match flat {
            FlatType::Defined { name, generics } => {
                return self.hydrate_defined(name, generics, bindings)
            }
            FlatType::Generic { symbol } => {
                return bindings.get(symbol).cloned().ok_or_else(|| {
                    IdlError::hydration(format!("unresolved generic '{}'", symbol))
                })
            }
            FlatType::Const { literal } => return Ok(Hydrated::Const(*literal)),
            FlatType::Option { prefix, content } => FullType::Option {
                prefix: *prefix,
                content: Box::new(self.hydrate_type(content, bindings).context("option")?),
            },
            FlatType::Vec { prefix, items } => FullType::Vec {
                prefix: *prefix,
                items: Box::new(self.hydrate_type(items, bindings).context("vec")?),
            },
            FlatType::Array { items, length } => {
                let items = self.hydrate_type(items, bindings).context("array items")?;
                let length = match self.hydrate(length, bindings).context("array length")? {
                    Hydrated::Const(length) => usize::try_from(length).map_err(|_| {
                        IdlError::hydration(format!("invalid array length {}", length))
                    })?,
                    Hydrated::Type(_) => {
                        return Err(IdlError::hydration(
                            "array length must resolve to a const literal",
                        ))
                    }
                };
                FullType::Array {
                    items: Box::new(items),
                    length,
                }
            }
            FlatType::String { prefix } => FullType::String { prefix: *prefix },
            FlatType::Struct { fields } => FullType::Struct {
                fields: self.hydrate_fields(fields, bindings)?,
            },
            FlatType::Enum { prefix, variants } => {
                FullType::Enum(self.hydrate_enum(*prefix, variants, bindings)?)
            }
            FlatType::Padded {
                before,
                end,
                content,
            } => FullType::Padded {
                before: *before,
                end: *end,
                content: Box::new(self.hydrate_type(content, bindings)?),
            },
            FlatType::Blob { bytes } => FullType::Blob {
                bytes: bytes.clone(),
            },
            FlatType::Primitive(primitive) => FullType::Primitive(*primitive),
        };
        Ok(Hydrated::Type(full))
    }

    fn hydrate_defined(
        &mut self,
        name: &str,
        generics: &[FlatType],
        bindings: &GenericBindings,
    ) -> IdlResult<Hydrated> {
        let typedefs = self.typedefs;
        let typedef: Cow<'a, Typedef> = match builtin_typedef(name) {
            Some(builtin) => Cow::Owned(builtin),
            None => Cow::Borrowed(
                typedefs
                    .get(name)
                    .ok_or_else(|| IdlError::hydration(format!("unknown typedef '{}'", name)))?,
            ),
        };
        if generics.len() < typedef.generics.len() {
            return Err(IdlError::hydration(format!(
                "typedef '{}' expects {} generic(s), got {}",
                name,
                typedef.generics.len(),
                generics.len()
            )));
        }
        let mut inner_bindings = GenericBindings::new();
        for (symbol, generic) in typedef.generics.iter().zip(generics) {
            let hydrated = self
                .hydrate(generic, bindings)
                .with_context(|| format!("{} generic {}", name, symbol))?;
            inner_bindings.insert(symbol.clone(), hydrated);
        }

        if self.expanding.iter().any(|expanding| expanding == name) {
            return Err(IdlError::hydration(format!(
                "recursive typedef '{}' ({} -> {})",
                name,
                self.expanding.join(" -> "),
                name
            )));
        }
        self.expanding.push(name.to_string());
        let content = self.hydrate(&typedef.content, &inner_bindings);
        self.expanding.pop();

        let content = match content.with_context(|| format!("typedef {}", name))? {
            Hydrated::Const(literal) => return Ok(Hydrated::Const(literal)),
            Hydrated::Type(content) => content,
        };
        if !typedef.serialization.is_bytemuck() {
            return Ok(Hydrated::Type(FullType::Typedef {
                name: name.to_string(),
                repr: typedef.repr,
                layout: None,
                content: Box::new(content),
            }));
        }
        let layout = layout_typedef(name, typedef.repr.as_ref(), &content)
            .with_context(|| format!("typedef {}", name))?;
        Ok(Hydrated::Type(FullType::Typedef {
            name: name.to_string(),
            repr: typedef.repr,
            layout: Some(LayoutInfo {
                alignment: layout.alignment,
                size: layout.size,
            }),
            content: Box::new(layout.value),
        }))
    }

    fn hydrate_fields(
        &mut self,
        fields: &FlatFields,
        bindings: &GenericBindings,
    ) -> IdlResult<FullFields> {
        match fields {
            FlatFields::Nothing => Ok(FullFields::Nothing),
            FlatFields::Named(fields) => {
                let mut full = Vec::with_capacity(fields.len());
                for field in fields {
                    full.push(FullFieldNamed {
                        name: field.name.clone(),
                        content: self
                            .hydrate_type(&field.content, bindings)
                            .with_context(|| format!("field {}", field.name))?,
                    });
                }
                Ok(FullFields::Named(full))
            }
            FlatFields::Unnamed(fields) => {
                let mut full = Vec::with_capacity(fields.len());
                for (index, field) in fields.iter().enumerate() {
                    full.push(FullFieldUnnamed {
                        content: self
                            .hydrate_type(&field.content, bindings)
                            .with_context(|| format!("field [{}]", index))?,
                    });
                }
                Ok(FullFields::Unnamed(full))
            }
        }
    }

    fn hydrate_enum(
        &mut self,
        prefix: Prefix,
        flat_variants: &[FlatEnumVariant],
        bindings: &GenericBindings,
    ) -> IdlResult<FullEnum> {
        let mut variants = Vec::with_capacity(flat_variants.len());
        for (index, variant) in flat_variants.iter().enumerate() {
            let code = variant.code.unwrap_or(index as u128);
            if code > prefix.max_value() {
                return Err(IdlError::hydration(format!(
                    "variant {} code {} does not fit the {} prefix",
                    variant.name, code, prefix
                )));
            }
            variants.push(FullEnumVariant {
                name: variant.name.clone(),
                code,
                fields: self
                    .hydrate_fields(&variant.fields, bindings)
                    .with_context(|| format!("variant {}", variant.name))?,
            });
        }
        variants.sort_by_key(|variant| variant.code);

        let mut mask = 0u128;
        let mut index_by_name = HashMap::with_capacity(variants.len());
        let mut index_by_code = HashMap::with_capacity(variants.len());
        for (index, variant) in variants.iter().enumerate() {
            mask |= variant.code;
            if index_by_name.insert(variant.name.clone(), index).is_some() {
                return Err(IdlError::hydration(format!(
                    "duplicate enum variant name '{}'",
                    variant.name
                )));
            }
            if index_by_code.insert(variant.code, index).is_some() {
                return Err(IdlError::hydration(format!(
                    "duplicate enum variant code {}",
                    variant.code
                )));
            }
        }
        Ok(FullEnum {
            prefix,
            mask,
            variants,
            index_by_name,
            index_by_code,
        })
    }
}
