//! Bytemuck layouts checked against what rustc does for equivalent types.

use std::mem::{align_of, offset_of, size_of};

use idl_toolbox_core::codec::{decode, encode};
use idl_toolbox_core::error::{ErrorKind, IdlResult};
use idl_toolbox_core::full::{FullType, LayoutInfo};
use idl_toolbox_core::hydrate::{hydrate_type, GenericBindings};
use idl_toolbox_core::parse::{parse_flat, parse_typedefs};
use serde_json::{json, Value};

fn typedef(types: Value, name: &str) -> IdlResult<FullType> {
    let typedefs = parse_typedefs(&types)?;
    hydrate_type(&parse_flat(&json!(name))?, &GenericBindings::new(), &typedefs)
}

fn layout_of(full: &FullType) -> LayoutInfo {
    match full {
        FullType::Typedef {
            layout: Some(info), ..
        } => *info,
        other => panic!("expected a laid out typedef, got {:?}", other),
    }
}

fn pair_types(repr: Value) -> Value {
    json!([{
        "name": "Pair",
        "serialization": "bytemuck",
        "repr": repr,
        "type": {"kind": "struct", "fields": [
            {"name": "a", "type": "u8"},
            {"name": "b", "type": "u32"},
        ]},
    }])
}

#[allow(dead_code)]
#[repr(C)]
struct Pair {
    a: u8,
    b: u32,
}

#[allow(dead_code)]
#[repr(C, packed)]
struct PackedPair {
    a: u8,
    b: u32,
}

#[allow(dead_code)]
#[repr(C)]
struct Tail {
    a: u64,
    b: u8,
}

#[allow(dead_code)]
#[repr(C)]
struct Outer {
    pair: Pair,
    flag: u8,
}

#[allow(dead_code)]
#[repr(C)]
struct Wide {
    x: u64,
}

#[allow(dead_code)]
#[repr(C, packed)]
struct PackedHolder {
    a: u8,
    b: Wide,
    c: Option<u8>,
}

#[allow(dead_code)]
#[repr(C)]
struct Spread {
    a: u8,
    b: [u16; 3],
}

#[allow(dead_code)]
#[repr(C, u8)]
enum Shape {
    Dot { x: u32 },
    Empty,
}

#[allow(dead_code)]
#[repr(u8)]
enum Tagged {
    Value(u32),
    Empty,
}

#[test]
fn test_c_struct_padding() {
    let full = typedef(pair_types(json!("c")), "Pair").unwrap();
    let info = layout_of(&full);
    assert_eq!(info.alignment, align_of::<Pair>());
    assert_eq!(info.size, size_of::<Pair>());
    assert_eq!((info.alignment, info.size), (4, 8));

    let encoded = encode(&full, &json!({"a": 1, "b": 2}), true).unwrap();
    assert_eq!(encoded.len(), size_of::<Pair>());
    assert_eq!(encoded[offset_of!(Pair, a)], 1);
    assert_eq!(encoded[offset_of!(Pair, b)], 2);
    assert_eq!(encoded, vec![1, 0, 0, 0, 2, 0, 0, 0]);

    let (consumed, value) = decode(&full, &encoded, 0).unwrap();
    assert_eq!(consumed, 8);
    assert_eq!(value, json!({"a": 1, "b": 2}));
}

#[test]
fn test_packed_struct() {
    let full = typedef(pair_types(json!({"kind": "c", "packed": true})), "Pair").unwrap();
    let info = layout_of(&full);
    assert_eq!(info.size, size_of::<PackedPair>());
    assert_eq!(info.alignment, align_of::<PackedPair>());
    assert_eq!(
        encode(&full, &json!({"a": 1, "b": 2}), true).unwrap(),
        vec![1, 2, 0, 0, 0]
    );
}

#[test]
fn test_trailing_padding() {
    let types = json!([{
        "name": "Tail",
        "serialization": "bytemuck",
        "repr": "c",
        "type": {"kind": "struct", "fields": [
            {"name": "a", "type": "u64"},
            {"name": "b", "type": "u8"},
        ]},
    }]);
    let full = typedef(types, "Tail").unwrap();
    let info = layout_of(&full);
    assert_eq!(info.size, size_of::<Tail>());
    assert_eq!(info.size % info.alignment, 0);

    let encoded = encode(&full, &json!({"a": "7", "b": 9}), true).unwrap();
    assert_eq!(encoded.len(), 16);
    assert_eq!(encoded[offset_of!(Tail, b)], 9);
    let (consumed, value) = decode(&full, &encoded, 0).unwrap();
    assert_eq!(consumed, 16);
    assert_eq!(value, json!({"a": "7", "b": 9}));
}

#[test]
fn test_nested_typedef_reuses_layout() {
    let mut types = pair_types(json!("c"));
    types.as_array_mut().unwrap().push(json!({
        "name": "Outer",
        "serialization": "bytemuck",
        "repr": "c",
        "type": {"kind": "struct", "fields": [
            {"name": "pair", "type": {"defined": "Pair"}},
            {"name": "flag", "type": "u8"},
        ]},
    }));
    let full = typedef(types, "Outer").unwrap();
    let info = layout_of(&full);
    assert_eq!(info.size, size_of::<Outer>());
    assert_eq!(info.alignment, align_of::<Outer>());
    let encoded = encode(&full, &json!({"pair": {"a": 1, "b": 2}, "flag": 3}), true).unwrap();
    assert_eq!(encoded.len(), 12);
    assert_eq!(encoded[offset_of!(Outer, flag)], 3);
}

#[test]
fn test_packed_struct_holding_aligned_typedef() {
    let types = json!([
        {
            "name": "Wide",
            "serialization": "bytemuck",
            "repr": "c",
            "type": {"kind": "struct", "fields": [{"name": "x", "type": "u64"}]},
        },
        {
            "name": "PackedHolder",
            "serialization": "bytemuck",
            "repr": {"kind": "c", "packed": true},
            "type": {"kind": "struct", "fields": [
                {"name": "a", "type": "u8"},
                {"name": "b", "type": {"defined": "Wide"}},
                {"name": "c", "type": {"option": "u8"}},
            ]},
        },
    ]);
    let full = typedef(types, "PackedHolder").unwrap();
    let info = layout_of(&full);
    assert_eq!(info.size, size_of::<PackedHolder>());
    assert_eq!(info.alignment, align_of::<PackedHolder>());
    assert_eq!((info.alignment, info.size), (1, 11));

    let state = json!({"a": 1, "b": {"x": "2"}, "c": 3});
    let encoded = encode(&full, &state, true).unwrap();
    assert_eq!(encoded.len(), size_of::<PackedHolder>());
    assert_eq!(encoded[offset_of!(PackedHolder, b)], 2);
    assert_eq!(encoded[offset_of!(PackedHolder, c)], 1);
    assert_eq!(encoded, vec![1, 2, 0, 0, 0, 0, 0, 0, 0, 1, 3]);
    assert_eq!(decode(&full, &encoded, 0).unwrap(), (11, state));
}

#[test]
fn test_array_field_alignment() {
    let types = json!([{
        "name": "Spread",
        "serialization": "bytemuck",
        "repr": "c",
        "type": {"kind": "struct", "fields": [
            {"name": "a", "type": "u8"},
            {"name": "b", "type": {"array": ["u16", 3]}},
        ]},
    }]);
    let full = typedef(types, "Spread").unwrap();
    assert_eq!(layout_of(&full).size, size_of::<Spread>());
    let encoded = encode(&full, &json!({"a": 1, "b": [2, 3, 4]}), true).unwrap();
    assert_eq!(encoded[offset_of!(Spread, b)], 2);
    assert_eq!(encoded, vec![1, 0, 2, 0, 3, 0, 4, 0]);
}

#[test]
fn test_c_enum_union_offset() {
    let types = json!([{
        "name": "Shape",
        "serialization": "bytemuck",
        "repr": "c",
        "type": {"kind": "enum", "variants": [
            {"name": "Dot", "fields": [{"name": "x", "type": "u32"}]},
            {"name": "Empty"},
        ]},
    }]);
    let full = typedef(types, "Shape").unwrap();
    let info = layout_of(&full);
    assert_eq!(info.size, size_of::<Shape>());
    assert_eq!(info.alignment, align_of::<Shape>());

    let dot = encode(&full, &json!({"Dot": {"x": 7}}), true).unwrap();
    assert_eq!(dot, vec![0, 0, 0, 0, 7, 0, 0, 0]);
    let empty = encode(&full, &json!("Empty"), true).unwrap();
    assert_eq!(empty, vec![1, 0, 0, 0, 0, 0, 0, 0]);

    let (consumed, value) = decode(&full, &empty, 0).unwrap();
    assert_eq!(consumed, 8);
    assert_eq!(value, json!("Empty"));
    let (_, value) = decode(&full, &dot, 0).unwrap();
    assert_eq!(value, json!({"Dot": {"x": 7}}));
}

#[test]
fn test_rust_enum_prefix_inside_variant() {
    let types = json!([{
        "name": "Tagged",
        "serialization": "bytemuck",
        "type": {"kind": "enum", "variants": [
            {"name": "Value", "fields": ["u32"]},
            {"name": "Empty"},
        ]},
    }]);
    let full = typedef(types, "Tagged").unwrap();
    let info = layout_of(&full);
    assert_eq!(info.size, size_of::<Tagged>());
    assert_eq!(info.alignment, align_of::<Tagged>());
    assert_eq!(
        encode(&full, &json!({"Value": [5]}), true).unwrap(),
        vec![0, 0, 0, 0, 5, 0, 0, 0]
    );
}

#[test]
fn test_rust_mode_rejects_wide_variants() {
    let types = json!([{
        "name": "Wide",
        "serialization": "bytemuck",
        "type": {"kind": "enum", "variants": [
            {"name": "Three", "fields": ["u8", "u16", "u32"]},
        ]},
    }]);
    let err = typedef(types, "Wide").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Layout);
    assert!(err.to_string().contains("use repr c"));
}

#[test]
fn test_option_layout() {
    let types = json!([{
        "name": "Maybe",
        "serialization": "bytemuck",
        "repr": "c",
        "type": {"kind": "struct", "fields": [
            {"name": "value", "type": {"option": "u64"}},
        ]},
    }]);
    let full = typedef(types, "Maybe").unwrap();
    assert_eq!(
        layout_of(&full),
        LayoutInfo {
            alignment: 8,
            size: 16
        }
    );
    let none = encode(&full, &json!({"value": null}), true).unwrap();
    assert_eq!(none, vec![0; 16]);
    let some = encode(&full, &json!({"value": 5}), true).unwrap();
    assert_eq!(some[0], 1);
    assert_eq!(some[8], 5);
    assert_eq!(some.len(), 16);
    assert_eq!(decode(&full, &some, 0).unwrap(), (16, json!({"value": "5"})));
}

#[test]
fn test_variable_length_rejected() {
    let types = json!([{
        "name": "Dynamic",
        "serialization": "bytemuck",
        "repr": "c",
        "type": {"kind": "struct", "fields": [{"name": "items", "type": {"vec": "u8"}}]},
    }]);
    let err = typedef(types, "Dynamic").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Layout);
    assert!(err.breadcrumbs().contains(&"field items"));
}

#[test]
fn test_transparent_multi_variant_enum_rejected() {
    let types = json!([{
        "name": "Choice",
        "serialization": "bytemuck",
        "repr": "transparent",
        "type": {"kind": "enum", "variants": ["A", "B"]},
    }]);
    let err = typedef(types, "Choice").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Layout);
}

#[test]
fn test_struct_size_covers_fields() {
    let types = json!([{
        "name": "Mixed",
        "serialization": "bytemuck",
        "repr": "c",
        "type": {"kind": "struct", "fields": [
            {"name": "a", "type": "u8"},
            {"name": "b", "type": "u64"},
            {"name": "c", "type": "u16"},
            {"name": "d", "type": "pubkey"},
        ]},
    }]);
    let info = layout_of(&typedef(types, "Mixed").unwrap());
    assert_eq!(info.size % info.alignment, 0);
    assert!(info.size >= 1 + 8 + 2 + 32);
    assert_eq!((info.alignment, info.size), (8, 56));
}
