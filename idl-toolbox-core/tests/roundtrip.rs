//! Property checks: canonical values survive encode then decode, and the
//! bytes agree with borsh.

use idl_toolbox_core::codec::{decode, encode};
use idl_toolbox_core::full::FullType;
use idl_toolbox_core::hydrate::{hydrate_type, GenericBindings};
use idl_toolbox_core::parse::parse_flat;
use proptest::prelude::*;
use serde_json::{json, Value};

fn full(node: Value) -> FullType {
    hydrate_type(
        &parse_flat(&node).unwrap(),
        &GenericBindings::new(),
        &Default::default(),
    )
    .unwrap()
}

fn check(full: &FullType, value: Value, expected: Vec<u8>) {
    let encoded = encode(full, &value, true).unwrap();
    assert_eq!(encoded, expected);
    let (consumed, decoded) = decode(full, &encoded, 0).unwrap();
    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, value);
}

proptest! {
    #[test]
    fn prop_u64(n in any::<u64>()) {
        check(&full(json!("u64")), json!(n.to_string()), borsh::to_vec(&n).unwrap());
    }

    #[test]
    fn prop_i128(n in any::<i128>()) {
        check(&full(json!("i128")), json!(n.to_string()), borsh::to_vec(&n).unwrap());
    }

    #[test]
    fn prop_vec_i16(items in proptest::collection::vec(any::<i16>(), 0..32)) {
        check(&full(json!({"vec": "i16"})), json!(items), borsh::to_vec(&items).unwrap());
    }

    #[test]
    fn prop_option_u32(item in proptest::option::of(any::<u32>())) {
        check(&full(json!({"option": "u32"})), json!(item), borsh::to_vec(&item).unwrap());
    }

    #[test]
    fn prop_string(text in ".{0,40}") {
        check(&full(json!("string")), json!(text), borsh::to_vec(&text).unwrap());
    }

    #[test]
    fn prop_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        check(&full(json!("bytes")), json!(bytes), borsh::to_vec(&bytes).unwrap());
    }
}
