//! roundtrip_prop.rs
//!
//! decode(encode(name, args)) == (name, args) for generated argument values.

use ixcodec_core::prelude::*;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

const IDL: &str = r#"{
    "instructions": [
        {"name": "mixed", "accounts": [], "args": [
            {"name": "flag", "type": "bool"},
            {"name": "small", "type": "i8"},
            {"name": "wide", "type": "i128"},
            {"name": "amount", "type": "u64"},
            {"name": "ratio", "type": "f64"},
            {"name": "blob", "type": "bytes"},
            {"name": "label", "type": "string"},
            {"name": "key", "type": "publicKey"},
            {"name": "limits", "type": {"option": {"vec": "u32"}}},
            {"name": "grid", "type": {"array": [{"array": ["i16", 2]}, 3]}},
            {"name": "action", "type": {"defined": "Action"}}
        ]},
        {"name": "many", "accounts": [], "args": [
            {"name": "actions", "type": {"vec": {"defined": "Action"}}}
        ]}
    ],
    "types": [
        {"name": "Action", "type": {"kind": "enum", "variants": [
            {"name": "Noop"},
            {"name": "Move", "fields": [{"name": "dx", "type": "i32"}, {"name": "dy", "type": "i32"}]},
            {"name": "Tag", "fields": ["string", {"option": "u8"}]}
        ]}}
    ]
}"#;

fn coder() -> InstructionCoder {
    InstructionCoder::new(&Idl::from_json_str(IDL).unwrap()).unwrap()
}

fn action() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::unit_variant("Noop")),
        (any::<i32>(), any::<i32>()).prop_map(|(dx, dy)| {
            Value::named_variant(
                "Move",
                [("dx".to_string(), Value::I32(dx)), ("dy".to_string(), Value::I32(dy))].into(),
            )
        }),
        (".{0,12}", option::of(any::<u8>())).prop_map(|(s, n)| {
            Value::tuple_variant("Tag", vec![Value::String(s), Value::Option(n.map(|n| Box::new(Value::U8(n))))])
        }),
    ]
}

fn grid() -> impl Strategy<Value = Value> {
    vec(vec(any::<i16>(), 2), 3).prop_map(|rows| {
        Value::Array(
            rows.into_iter()
                .map(|r| Value::Array(r.into_iter().map(Value::I16).collect()))
                .collect(),
        )
    })
}

fn mixed_args() -> impl Strategy<Value = Fields> {
    (
        any::<bool>(),
        any::<i8>(),
        any::<i128>(),
        any::<u64>(),
        // NaN breaks equality; every finite or infinite value roundtrips.
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        vec(any::<u8>(), 0..40),
        ".{0,24}",
        any::<[u8; 32]>(),
        option::of(vec(any::<u32>(), 0..8)),
        grid(),
        action(),
    )
        .prop_map(|(flag, small, wide, amount, ratio, blob, label, key, limits, grid, action)| {
            let limits = Value::Option(limits.map(|l| Box::new(Value::Vec(l.into_iter().map(Value::U32).collect()))));
            [
                ("flag", Value::Bool(flag)),
                ("small", Value::I8(small)),
                ("wide", Value::I128(wide)),
                ("amount", Value::U64(amount)),
                ("ratio", Value::F64(ratio)),
                ("blob", Value::Bytes(blob)),
                ("label", Value::String(label)),
                ("key", Value::PublicKey(PublicKey(key))),
                ("limits", limits),
                ("grid", grid),
                ("action", action),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
        })
}

proptest! {
    #[test]
    fn mixed_roundtrip(args in mixed_args()) {
        let c = coder();
        let data = c.encode("mixed", &args).unwrap();
        let ix = c.decode(&data).unwrap().unwrap();
        prop_assert_eq!(ix, Instruction::new("mixed", args));
    }

    #[test]
    fn enum_vec_roundtrip(actions in vec(action(), 0..10)) {
        let c = coder();
        let args: Fields = [("actions".to_string(), Value::Vec(actions))].into();
        let data = c.encode("many", &args).unwrap();
        prop_assert_eq!(c.decode(&data).unwrap(), Some(Instruction::new("many", args)));
    }

    #[test]
    fn truncation_never_panics(args in mixed_args(), cut in 0usize..64) {
        let c = coder();
        let data = c.encode("mixed", &args).unwrap();
        let end = data.len().saturating_sub(cut + 1);
        // Shorter than the discriminator is malformed; otherwise the body is
        // missing bytes. Either way the result is an error.
        if end > 0 {
            prop_assert!(c.decode(&data[..end]).is_err());
        }
    }
}
