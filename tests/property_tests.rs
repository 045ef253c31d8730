//! Property-based tests for decoding and re-encoding.
//!
//! `serde_json` acts as the oracle: whatever it accepts as a document must be accepted
//! here too, and the other way round.

use proptest::prelude::*;
use serde_ordered::{from_str, to_string, to_string_pretty, OrderedMap, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        "\\PC{0,8}".prop_map(Value::String),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-e]{1,3}", inner), 0..6).prop_map(|pairs| {
                let mut map = OrderedMap::new();
                for (key, value) in pairs {
                    map.insert(key, value);
                }
                Value::Object(map)
            }),
        ]
    })
}

const TOKENS: &[&str] = &[
    "[", "]", "{", "}", ":", ",", " ", "\"a\"", "\"b\"", "1", "0", "-2.5", "true", "null",
];

fn token_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(TOKENS), 0..10).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_acceptance_matches_serde_json(input in token_soup()) {
        let ours = from_str::<Value>(&input).is_ok();
        let oracle = serde_json::from_str::<serde_json::Value>(&input).is_ok();
        prop_assert_eq!(ours, oracle, "input: {:?}", input);
    }

    #[test]
    fn prop_compact_text_roundtrips_byte_exact(value in tree()) {
        let text = to_string(&value).unwrap();
        let decoded: Value = from_str(&text).unwrap();
        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(to_string(&decoded).unwrap(), text);
    }

    #[test]
    fn prop_encoded_text_agrees_with_serde_json(value in tree()) {
        let text = to_string(&value).unwrap();
        let oracle: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(serde_json::to_value(&value).unwrap(), oracle);
    }

    #[test]
    fn prop_pretty_text_decodes_to_same_tree(value in tree()) {
        let text = to_string_pretty(&value).unwrap();
        prop_assert_eq!(from_str::<Value>(&text).unwrap(), value);
    }

    #[test]
    fn prop_first_insertion_fixes_position(
        ops in prop::collection::vec(("[a-h]", any::<u8>()), 0..40)
    ) {
        let mut map = OrderedMap::new();
        let mut expected: Vec<String> = Vec::new();
        for (key, value) in &ops {
            if !expected.contains(key) {
                expected.push(key.clone());
            }
            map.insert(key.clone(), *value);
        }

        let keys: Vec<String> = map.keys().cloned().collect();
        prop_assert_eq!(keys, expected);

        for key in map.keys() {
            let last = ops.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
            prop_assert_eq!(map.get(key), last);
        }
    }

    #[test]
    fn prop_remove_then_insert_moves_to_end(
        keys in prop::collection::hash_set("[a-z]{1,4}", 2..10),
        pick in any::<prop::sample::Index>()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut map = OrderedMap::new();
        for (i, key) in keys.iter().enumerate() {
            map.insert(key.clone(), i);
        }

        let moved = pick.get(&keys).clone();
        let old = map.remove(&moved);
        prop_assert!(old.is_some());
        map.insert(moved.clone(), 99);

        prop_assert_eq!(map.len(), keys.len());
        prop_assert_eq!(map.keys().last(), Some(&moved));
    }
}
