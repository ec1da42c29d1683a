//! Native memory layout for plain-old-data ("bytemuck") typedefs.
//!
//! Programs that store their accounts as a raw memory image write bytes the
//! way the compiler laid the struct out: fields aligned, enums padded to their
//! largest variant, no length prefixes. This module reproduces those rules and
//! returns the same type with explicit [`FullType::Padded`] nodes, so the codec
//! can read and write the image by plain concatenation.
//!
//! Two modes exist. `repr(C)` (and `transparent`) follows the C rules exactly.
//! The default Rust mode is an approximation: fields stay in declaration
//! order, which is only guaranteed to match the compiler for up to two fields
//! next to an enum tag, so larger variants are rejected.

use crate::error::{Context, IdlError, IdlResult};
use crate::flat::{Repr, ReprKind};
use crate::full::{FullEnum, FullFields, FullType, LayoutInfo};

/// Alignment and size of a type, and the type with padding made explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub alignment: usize,
    pub size: usize,
    pub value: FullType,
}

/// Lay out the content of the typedef `name` according to its `repr`.
pub fn layout_typedef(name: &str, repr: Option<&Repr>, content: &FullType) -> IdlResult<Layout> {
    if let (Some(repr), FullType::Enum(full_enum)) = (repr, content) {
        if repr.kind == ReprKind::Transparent && full_enum.variants.len() > 1 {
            return Err(IdlError::layout(format!(
                "repr(transparent) is not supported on enum '{}' with {} variants",
                name,
                full_enum.variants.len()
            )));
        }
    }
    Rules::from_repr(repr).layout(content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    C,
    Rust,
}

#[derive(Debug, Clone, Copy)]
struct Rules {
    mode: Mode,
    packed: bool,
}

struct FieldsLayout {
    alignment: usize,
    size: usize,
    /// Offset right after the last field, before trailing padding.
    end: usize,
    fields: FullFields,
}

fn align_up(offset: usize, alignment: usize) -> usize {
    offset.div_ceil(alignment) * alignment
}

fn add_size(a: usize, b: usize) -> IdlResult<usize> {
    a.checked_add(b)
        .ok_or_else(|| IdlError::layout(format!("size {} + {} overflows", a, b)))
}

fn pad_before(before: usize, value: FullType) -> FullType {
    if before == 0 {
        return value;
    }
    FullType::Padded {
        before,
        end: 0,
        content: Box::new(value),
    }
}

fn pad_to(size: usize, encoded: usize, value: FullType) -> FullType {
    if size <= encoded {
        return value;
    }
    FullType::Padded {
        before: 0,
        end: size,
        content: Box::new(value),
    }
}

fn pad_first_field(fields: FullFields, before: usize) -> FullFields {
    if before == 0 || fields.is_empty() {
        return fields;
    }
    let mut contents: Vec<FullType> = fields.contents().into_iter().cloned().collect();
    let first = contents.remove(0);
    contents.insert(0, pad_before(before, first));
    fields.with_contents(contents)
}

fn field_label(fields: &FullFields, index: usize) -> String {
    match fields {
        FullFields::Named(named) => format!("field {}", named[index].name),
        _ => format!("field [{}]", index),
    }
}

impl Rules {
    fn from_repr(repr: Option<&Repr>) -> Self {
        match repr {
            Some(repr) => Rules {
                mode: match repr.kind {
                    ReprKind::C | ReprKind::Transparent => Mode::C,
                    ReprKind::Rust => Mode::Rust,
                },
                packed: repr.packed,
            },
            None => Rules {
                mode: Mode::Rust,
                packed: false,
            },
        }
    }

    fn align(&self, alignment: usize) -> usize {
        if self.packed {
            1
        } else {
            alignment.max(1)
        }
    }

    fn layout(&self, full: &FullType) -> IdlResult<Layout> {
        match full {
            FullType::Typedef {
                layout: Some(info), ..
            } => Ok(Layout {
                alignment: self.align(info.alignment),
                size: info.size,
                value: full.clone(),
            }),
            FullType::Typedef {
                name,
                repr,
                layout: None,
                content,
            } => {
                let rules = repr.as_ref().map_or(*self, |repr| Rules::from_repr(Some(repr)));
                let inner = rules
                    .layout(content)
                    .with_context(|| format!("typedef {}", name))?;
                Ok(Layout {
                    alignment: self.align(inner.alignment),
                    size: inner.size,
                    value: FullType::Typedef {
                        name: name.clone(),
                        repr: *repr,
                        layout: Some(LayoutInfo {
                            alignment: inner.alignment,
                            size: inner.size,
                        }),
                        content: Box::new(inner.value),
                    },
                })
            }
            FullType::Primitive(primitive) => Ok(Layout {
                alignment: self.align(primitive.alignment()),
                size: primitive.size(),
                value: full.clone(),
            }),
            FullType::Option { prefix, content } => {
                let inner = self.layout(content).context("option")?;
                let prefix_size = prefix.size();
                let content_alignment = self.align(inner.alignment);
                let alignment = self.align(prefix_size).max(content_alignment);
                let content_offset = align_up(prefix_size, content_alignment);
                let size = add_size(content_offset, inner.size)?;
                let option = FullType::Option {
                    prefix: *prefix,
                    content: Box::new(pad_before(content_offset - prefix_size, inner.value)),
                };
                Ok(Layout {
                    alignment,
                    size,
                    value: pad_to(size, prefix_size, option),
                })
            }
            FullType::Array { items, length } => {
                let inner = self.layout(items).context("array items")?;
                let size = inner.size.checked_mul(*length).ok_or_else(|| {
                    IdlError::layout(format!("array of {} items overflows", length))
                })?;
                Ok(Layout {
                    alignment: self.align(inner.alignment),
                    size,
                    value: FullType::Array {
                        items: Box::new(inner.value),
                        length: *length,
                    },
                })
            }
            FullType::Struct { fields } => {
                let laid = self.layout_fields(fields, 0)?;
                Ok(Layout {
                    alignment: laid.alignment,
                    size: laid.size,
                    value: pad_to(
                        laid.size,
                        laid.end,
                        FullType::Struct {
                            fields: laid.fields,
                        },
                    ),
                })
            }
            FullType::Enum(full_enum) => match self.mode {
                Mode::C => self.layout_enum_c(full_enum),
                Mode::Rust => self.layout_enum_rust(full_enum),
            },
            FullType::Padded {
                before,
                end,
                content,
            } => {
                let inner = self.layout(content)?;
                let size = add_size(*before, inner.size.max(*end))?;
                Ok(Layout {
                    alignment: self.align(inner.alignment),
                    size,
                    value: FullType::Padded {
                        before: *before,
                        end: *end,
                        content: Box::new(inner.value),
                    },
                })
            }
            FullType::Blob { bytes } => Ok(Layout {
                alignment: 1,
                size: bytes.len(),
                value: full.clone(),
            }),
            FullType::Vec { .. } | FullType::String { .. } => Err(IdlError::layout(format!(
                "variable-length {} has no plain-old-data layout",
                full.describe()
            ))),
        }
    }

    /// Fold fields in declaration order, starting right after a `prefix_size` tag.
    fn layout_fields(&self, fields: &FullFields, prefix_size: usize) -> IdlResult<FieldsLayout> {
        if self.mode == Mode::Rust && prefix_size > 0 && fields.len() > 2 {
            return Err(IdlError::layout(format!(
                "rust field order is unspecified for {} fields after a {} byte tag, use repr c",
                fields.len(),
                prefix_size
            )));
        }
        let mut alignment = self.align(prefix_size);
        let mut offset = prefix_size;
        let mut contents = Vec::with_capacity(fields.len());
        for (index, content) in fields.contents().into_iter().enumerate() {
            let inner = self
                .layout(content)
                .with_context(|| field_label(fields, index))?;
            // Nested typedefs keep their own layout; packing only moves them.
            let field_alignment = self.align(inner.alignment);
            let start = align_up(offset, field_alignment);
            contents.push(pad_before(start - offset, inner.value));
            offset = add_size(start, inner.size)?;
            alignment = alignment.max(field_alignment);
        }
        Ok(FieldsLayout {
            alignment,
            size: align_up(offset, alignment),
            end: offset,
            fields: fields.with_contents(contents),
        })
    }

    fn layout_enum_c(&self, full_enum: &FullEnum) -> IdlResult<Layout> {
        let prefix_size = full_enum.prefix.size();
        let mut union_alignment = 1;
        let mut union_size = 0;
        let mut laid_variants = Vec::with_capacity(full_enum.variants.len());
        for variant in &full_enum.variants {
            let laid = self
                .layout_fields(&variant.fields, 0)
                .with_context(|| format!("variant {}", variant.name))?;
            union_alignment = union_alignment.max(self.align(laid.alignment));
            union_size = union_size.max(laid.size);
            laid_variants.push(laid.fields);
        }
        let alignment = self.align(prefix_size).max(union_alignment);
        let union_offset = align_up(prefix_size, union_alignment);
        let size = align_up(add_size(union_offset, union_size)?, alignment);
        let fields = laid_variants
            .into_iter()
            .map(|fields| pad_first_field(fields, union_offset - prefix_size))
            .collect();
        Ok(Layout {
            alignment,
            size,
            value: pad_to(
                size,
                prefix_size,
                FullType::Enum(full_enum.with_variant_fields(fields)),
            ),
        })
    }

    fn layout_enum_rust(&self, full_enum: &FullEnum) -> IdlResult<Layout> {
        let prefix_size = full_enum.prefix.size();
        let mut alignment = self.align(prefix_size);
        let mut size = prefix_size;
        let mut laid_variants = Vec::with_capacity(full_enum.variants.len());
        for variant in &full_enum.variants {
            let laid = self
                .layout_fields(&variant.fields, prefix_size)
                .with_context(|| format!("variant {}", variant.name))?;
            alignment = alignment.max(laid.alignment);
            size = size.max(laid.size);
            laid_variants.push(laid.fields);
        }
        let size = align_up(size, alignment);
        Ok(Layout {
            alignment,
            size,
            value: pad_to(
                size,
                prefix_size,
                FullType::Enum(full_enum.with_variant_fields(laid_variants)),
            ),
        })
    }
}
