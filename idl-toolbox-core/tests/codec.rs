//! Codec behaviour, cross-checked against borsh for borsh-shaped types.

use borsh::BorshSerialize;
use idl_toolbox_core::codec::{decode, encode};
use idl_toolbox_core::error::{ErrorKind, IdlResult};
use idl_toolbox_core::full::FullType;
use idl_toolbox_core::hydrate::{hydrate_type, GenericBindings};
use idl_toolbox_core::parse::{parse_flat, parse_typedefs};
use serde_json::{json, Value};

const WSOL: &str = "So11111111111111111111111111111111111111112";

fn full(node: Value) -> FullType {
    full_with(json!([]), node).unwrap()
}

fn full_with(types: Value, node: Value) -> IdlResult<FullType> {
    let typedefs = parse_typedefs(&types)?;
    hydrate_type(&parse_flat(&node)?, &GenericBindings::new(), &typedefs)
}

fn round_trip(full: &FullType, value: Value) -> Vec<u8> {
    let encoded = encode(full, &value, true).unwrap();
    let (consumed, decoded) = decode(full, &encoded, 0).unwrap();
    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, value);
    encoded
}

#[derive(BorshSerialize)]
enum Side {
    Bid,
    Ask { limit: u64 },
}

#[derive(BorshSerialize)]
struct Order {
    id: u8,
    owner: [u8; 32],
    side: Side,
    size: u64,
    price: i128,
    memo: String,
    fills: Vec<u16>,
    expiry: Option<i32>,
    active: bool,
    tag: [u8; 4],
    ratio: f64,
}

fn order_types() -> Value {
    json!([
        {"name": "Side", "type": {"kind": "enum", "variants": [
            {"name": "Bid"},
            {"name": "Ask", "fields": [{"name": "limit", "type": "u64"}]},
        ]}},
        {"name": "Order", "type": {"kind": "struct", "fields": [
            {"name": "id", "type": "u8"},
            {"name": "owner", "type": "pubkey"},
            {"name": "side", "type": {"defined": {"name": "Side"}}},
            {"name": "size", "type": "u64"},
            {"name": "price", "type": "i128"},
            {"name": "memo", "type": "string"},
            {"name": "fills", "type": {"vec": "u16"}},
            {"name": "expiry", "type": {"option": "i32"}},
            {"name": "active", "type": "bool"},
            {"name": "tag", "type": {"array": ["u8", 4]}},
            {"name": "ratio", "type": "f64"},
        ]}},
    ])
}

#[test]
fn test_matches_borsh_struct() {
    let full = full_with(order_types(), json!("Order")).unwrap();
    let value = json!({
        "id": 3,
        "owner": WSOL,
        "side": {"Ask": {"limit": "18446744073709551615"}},
        "size": "42",
        "price": "-170141183460469231731687303715884105728",
        "memo": "gm",
        "fills": [1, 2, 65535],
        "expiry": -5,
        "active": true,
        "tag": [1, 2, 3, 4],
        "ratio": 0.5,
    });
    let encoded = round_trip(&full, value);

    let mut owner = [0u8; 32];
    owner.copy_from_slice(&idl_toolbox_core::bytes::pubkey_from_str(WSOL).unwrap());
    let expected = borsh::to_vec(&Order {
        id: 3,
        owner,
        side: Side::Ask { limit: u64::MAX },
        size: 42,
        price: i128::MIN,
        memo: "gm".to_string(),
        fills: vec![1, 2, 65535],
        expiry: Some(-5),
        active: true,
        tag: [1, 2, 3, 4],
        ratio: 0.5,
    })
    .unwrap();
    assert_eq!(encoded, expected);
}

#[test]
fn test_matches_borsh_unit_variant_and_none() {
    let side = full_with(order_types(), json!("Side")).unwrap();
    assert_eq!(
        round_trip(&side, json!("Bid")),
        borsh::to_vec(&Side::Bid).unwrap()
    );
    let option = full(json!({"option": "u32"}));
    assert_eq!(
        round_trip(&option, json!(null)),
        borsh::to_vec(&None::<u32>).unwrap()
    );
}

#[test]
fn test_vec_of_bytes() {
    let vec = full(json!({"vec32": "u8"}));
    assert_eq!(
        encode(&vec, &json!([1, 2, 3]), true).unwrap(),
        vec![0x03, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03]
    );
    assert_eq!(
        encode(&vec, &json!({"base16": "0102"}), true).unwrap(),
        vec![2, 0, 0, 0, 1, 2]
    );
    let short = full(json!({"vec8": "u8"}));
    assert_eq!(encode(&short, &json!([7]), true).unwrap(), vec![1, 7]);
}

#[test]
fn test_unprefixed_top_level_only() {
    let string = full(json!("string"));
    assert_eq!(encode(&string, &json!("abc"), false).unwrap(), b"abc".to_vec());

    let nested = full(json!({"vec": "string"}));
    assert_eq!(
        encode(&nested, &json!(["a"]), false).unwrap(),
        vec![1, 0, 0, 0, b'a']
    );
}

#[test]
fn test_wide_integers_decode_as_strings() {
    let u64_type = full(json!("u64"));
    let (_, value) = decode(&u64_type, &u64::MAX.to_le_bytes(), 0).unwrap();
    assert_eq!(value, json!("18446744073709551615"));
    // Small numbers are accepted as JSON numbers too.
    assert_eq!(encode(&u64_type, &json!(5), true).unwrap(), 5u64.to_le_bytes().to_vec());

    let i64_type = full(json!("i64"));
    round_trip(&i64_type, json!("-9223372036854775808"));

    let u16_type = full(json!("u16"));
    round_trip(&u16_type, json!(65535));
}

#[test]
fn test_integer_range_checked() {
    let err = encode(&full(json!("u8")), &json!(256), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(err.to_string().contains("out of range for u8"));
    assert!(encode(&full(json!("u32")), &json!(-1), true).is_err());
    assert!(encode(&full(json!("i8")), &json!("-129"), true).is_err());
}

#[test]
fn test_struct_keys_match_camel_case() {
    let full = full(json!({"fields": [
        {"name": "ownerKey", "type": "pubkey"},
        {"name": "bump", "type": {"option": "u8"}},
    ]}));
    let encoded = encode(&full, &json!({"ownerKey": WSOL}), true).unwrap();
    assert_eq!(encoded.len(), 33);
    assert_eq!(encoded[32], 0);
    let (_, value) = decode(&full, &encoded, 0).unwrap();
    assert_eq!(value, json!({"owner_key": WSOL, "bump": null}));
}

#[test]
fn test_enum_value_forms() {
    let full = full(json!({"variants": [
        {"name": "Stop"},
        {"name": "Go", "code": 5, "fields": ["u8"]},
    ]}));
    assert_eq!(encode(&full, &json!("Stop"), true).unwrap(), vec![0]);
    assert_eq!(encode(&full, &json!(0), true).unwrap(), vec![0]);
    assert_eq!(encode(&full, &json!("0"), true).unwrap(), vec![0]);
    assert_eq!(encode(&full, &json!({"Go": [9]}), true).unwrap(), vec![5, 9]);
    assert_eq!(encode(&full, &json!({"5": 9}), true).unwrap(), vec![5, 9]);
    assert_eq!(decode(&full, &[5, 9], 0).unwrap(), (2, json!({"Go": [9]})));

    let err = decode(&full, &[3], 0).unwrap_err();
    assert!(err.to_string().contains("unknown enum code 3"));
    let err = encode(&full, &json!("Reverse"), true).unwrap_err();
    assert!(err.to_string().contains("unknown enum variant"));
}

#[test]
fn test_invalid_tags_rejected() {
    let option = full(json!({"option": "u8"}));
    let err = decode(&option, &[2, 0], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(err.to_string().contains("invalid option tag 2"));

    let flag = full(json!("bool"));
    assert!(decode(&flag, &[2], 0).is_err());
    assert!(encode(&flag, &json!(1), true).is_err());
}

#[test]
fn test_array_length_mismatch() {
    let array = full(json!({"array": ["u16", 2]}));
    let err = encode(&array, &json!([1, 2, 3]), true).unwrap_err();
    assert!(err.to_string().contains("expected 2 item(s), found 3"));
}

#[test]
fn test_truncated_input() {
    let full = full(json!({"fields": [{"name": "a", "type": "u8"}, {"name": "b", "type": "u32"}]}));
    let err = decode(&full, &[1, 2, 3], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert_eq!(err.breadcrumbs(), vec!["field b (offset 1)"]);
}

#[test]
fn test_blob_is_verified() {
    let full = full(json!({"fields": [
        {"name": "magic", "type": {"bytes": [0xca, 0xfe]}},
        {"name": "n", "type": "u8"},
    ]}));
    let encoded = encode(&full, &json!({"n": 1}), true).unwrap();
    assert_eq!(encoded, vec![0xca, 0xfe, 1]);
    assert_eq!(decode(&full, &encoded, 0).unwrap().1, json!({"magic": null, "n": 1}));
    assert!(decode(&full, &[0xca, 0xff, 1], 0).is_err());
}

#[test]
fn test_padded_zero_fill() {
    let full = full(json!({"padded": {"before": 1, "end": 4, "type": "u16"}}));
    let encoded = round_trip(&full, json!(258));
    assert_eq!(encoded, vec![0, 2, 1, 0, 0]);
}

#[test]
fn test_errors_carry_breadcrumbs() {
    let types = json!([{"name": "Vault", "type": {"kind": "struct", "fields": [
        {"name": "owner", "type": "pubkey"},
    ]}}]);
    let full = full_with(types, json!("Vault")).unwrap();
    let err = encode(&full, &json!({"owner": "not-base58!"}), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert_eq!(err.breadcrumbs(), vec!["Vault", "field owner"]);
    assert!(err
        .to_string()
        .starts_with("Vault > field owner > codec: invalid pubkey"));
}

#[test]
fn test_decode_at_offset() {
    let full = full(json!("u16"));
    assert_eq!(decode(&full, &[9, 9, 1, 2], 2).unwrap(), (2, json!(513)));
}

#[test]
fn test_zero_sized_items_bounded_by_input() {
    let unit_vec = full(json!({"vec64": {"fields": null}}));
    let err = decode(&unit_vec, &[0xff; 8], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(err.to_string().contains("zero-sized items"), "{}", err);

    let unit_vec = full(json!({"vec32": {"fields": null}}));
    assert_eq!(
        decode(&unit_vec, &[2, 0, 0, 0, 9, 9], 0).unwrap(),
        (4, json!([null, null]))
    );
    assert_eq!(decode(&unit_vec, &[0, 0, 0, 0], 0).unwrap(), (4, json!([])));
}

#[test]
fn test_float_encoding() {
    let single = full(json!("f32"));
    assert_eq!(round_trip(&single, json!(0.5)), 0.5f32.to_le_bytes().to_vec());
    let encoded = encode(&single, &json!(0.1), true).unwrap();
    assert_eq!(encoded, 0.1f32.to_le_bytes().to_vec());
    assert_eq!(decode(&single, &encoded, 0).unwrap().1, json!(0.1f32 as f64));

    let err = encode(&single, &json!(1e39), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(err.to_string().contains("out of range for f32"), "{}", err);

    let double = full(json!("f64"));
    round_trip(&double, json!(-2.25));
    assert!(encode(&double, &json!("inf"), true).is_err());
    assert!(encode(&double, &json!("NaN"), true).is_err());
}

#[test]
fn test_oversized_padding_fails_cleanly() {
    let full = full(json!({"padded": {"before": u64::MAX, "type": "u8"}}));
    assert_eq!(encode(&full, &json!(1), true).unwrap_err().kind(), ErrorKind::Codec);
    assert_eq!(decode(&full, &[1], 0).unwrap_err().kind(), ErrorKind::Codec);
}
