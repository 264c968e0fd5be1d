/// Property-Based Roundtrip Tests
///
/// Uses the `proptest` crate to generate random value trees and verify that
/// `parse(stringify(v)) == v` holds for all generated inputs, compact and
/// indented, along with the reviver/replacer filtering guarantees.
///
/// Strategies generate:
/// - Strings with markup characters, quotes, whitespace and unicode
/// - Any non-NaN float (NaN never equals itself; covered by unit tests)
/// - Dates at millisecond resolution (the encoded precision), including
///   signed and five-digit years
/// - Arrays and objects nested up to 4 levels, including empty ones
///
/// Excluded: control characters and `\r`, which XML 1.0 text cannot carry
/// unchanged.
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use xmlson_core::{parse, parse_with, stringify, stringify_with, Replacer, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,10}",
        "[a-z0-9 <>&'\".:-]{0,8}",
        Just(String::new()),
    ]
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,30}",
        "[a-zA-Z0-9<>&'\"\\]\\[;#=/ \t\n-]{0,20}",
        Just(String::new()),
        Just("   ".to_string()),
        Just("true".to_string()),
        Just("42".to_string()),
        Just("caf\u{00e9} \u{4f60}\u{597d}".to_string()),
    ]
}

fn arb_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_000i64..1_000_000i64).prop_map(|n| n as f64),
        any::<f64>().prop_filter("NaN never compares equal", |f| !f.is_nan()),
    ]
}

/// Milliseconds spanning chrono's whole year range, plus a denser band
/// around the present.
fn arb_date() -> impl Strategy<Value = Value> {
    prop_oneof![
        -2_000_000_000_000i64..4_000_000_000_000i64,
        -8_200_000_000_000_000i64..8_200_000_000_000_000i64,
    ]
    .prop_filter_map("representable", |ms| {
        Utc.timestamp_millis_opt(ms).single().map(Value::Date)
    })
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        arb_number().prop_map(Value::Number),
        arb_string().prop_map(Value::String),
        arb_date(),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|pairs| pairs.into_iter().collect::<Value>()),
        ]
    })
}

/// True if no object anywhere in the tree has a key outside `allowed`.
fn only_keys(value: &Value, allowed: &[&str]) -> bool {
    match value {
        Value::Array(items) => items.iter().all(|v| only_keys(v, allowed)),
        Value::Object(map) => map
            .iter()
            .all(|(k, v)| allowed.contains(&k.as_str()) && only_keys(v, allowed)),
        _ => true,
    }
}

fn contains_number(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::Array(items) => items.iter().any(contains_number),
        Value::Object(map) => map.values().any(contains_number),
        _ => false,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Core roundtrip property: parse(stringify(v)) == v.
    #[test]
    fn roundtrip_preserves_value(value in arb_value()) {
        let xml = stringify(&value).unwrap();
        let decoded = parse(&xml).unwrap();
        prop_assert_eq!(&value, &decoded, "XML: {}", xml);
    }

    /// Indentation only adds whitespace between container children.
    #[test]
    fn roundtrip_indented(value in arb_value(), indent in -3i64..15) {
        let xml = stringify_with(&value, Replacer::All, indent).unwrap();
        let decoded = parse(&xml).unwrap();
        prop_assert_eq!(&value, &decoded, "XML: {}", xml);
    }

    /// Any indentation past ten spaces encodes exactly like ten.
    #[test]
    fn indent_clamps(value in arb_value(), indent in 10i64..100) {
        let clamped = stringify_with(&value, Replacer::All, 10).unwrap();
        let wide = stringify_with(&value, Replacer::All, indent).unwrap();
        prop_assert_eq!(clamped, wide);
    }

    /// An identity reviver changes nothing.
    #[test]
    fn identity_reviver(value in arb_value()) {
        let xml = stringify(&value).unwrap();
        let revived = parse_with(&xml, |_, v| Some(v)).unwrap();
        prop_assert_eq!(&value, &revived);
    }

    /// A reviver that drops numbers leaves none anywhere below the root.
    #[test]
    fn reviver_drops_numbers_everywhere(value in arb_value()) {
        let xml = stringify(&value).unwrap();
        let revived = parse_with(&xml, |_, v| match v {
            Value::Number(_) => None,
            other => Some(other),
        })
        .unwrap();
        prop_assert!(!contains_number(&revived), "left a number in {:?}", revived);
    }

    /// Allow-listed encoding keeps only the listed keys at every level.
    #[test]
    fn allow_list_filters_every_level(value in arb_value()) {
        let xml = stringify_with(&value, Replacer::keys(["a", "b"]), 0).unwrap();
        let decoded = parse(&xml).unwrap();
        prop_assert!(only_keys(&decoded, &["a", "b"]), "XML: {}", xml);
    }

    /// Output always starts with the declaration and has exactly one root.
    #[test]
    fn output_is_single_rooted(value in arb_value()) {
        let xml = stringify(&value).unwrap();
        prop_assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><"#));
        prop_assert!(!xml.ends_with('\n'));
    }
}
