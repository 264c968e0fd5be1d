/// Encoder contract tests: exact XML produced for each value shape,
/// indentation handling and nesting limits.
use chrono::{TimeZone, Utc};
use xmlson_core::{stringify, stringify_with, Encoder, Indent, Replacer, Value, XmlsonError};

const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Assert that compact encoding produces `DECL` followed by `expected_body`.
fn assert_encode(value: &Value, expected_body: &str) {
    let xml = stringify(value).unwrap();
    let expected = format!("{DECL}{expected_body}");
    assert_eq!(
        xml, expected,
        "Encode mismatch:\n  value:    {value:?}\n  got:      {xml}\n  expected: {expected}"
    );
}

fn sample_object() -> Value {
    [
        ("a", Value::from(1)),
        (
            "b",
            Value::Array(vec![Value::from(true), Value::Null]),
        ),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn encode_null_is_self_closing() {
    assert_encode(&Value::Null, r#"<object name=""/>"#);
}

#[test]
fn encode_bool_true() {
    assert_encode(&Value::Boolean(true), r#"<boolean name="">true</boolean>"#);
}

#[test]
fn encode_bool_false() {
    assert_encode(&Value::Boolean(false), r#"<boolean name="">false</boolean>"#);
}

#[test]
fn encode_integer_has_no_fraction() {
    assert_encode(&Value::Number(42.0), r#"<number name="">42</number>"#);
}

#[test]
fn encode_negative_float() {
    assert_encode(&Value::Number(-3.25), r#"<number name="">-3.25</number>"#);
}

#[test]
fn encode_large_number_no_exponent() {
    assert_encode(&Value::Number(1e21), r#"<number name="">1000000000000000000000</number>"#);
}

#[test]
fn encode_non_finite_numbers() {
    assert_encode(&Value::Number(f64::NAN), r#"<number name="">NaN</number>"#);
    assert_encode(&Value::Number(f64::INFINITY), r#"<number name="">Infinity</number>"#);
    assert_encode(
        &Value::Number(f64::NEG_INFINITY),
        r#"<number name="">-Infinity</number>"#,
    );
}

#[test]
fn encode_string_simple() {
    assert_encode(&Value::from("hello world"), r#"<string name="">hello world</string>"#);
}

#[test]
fn encode_string_escapes_markup() {
    assert_encode(&Value::from("a<b & c>d"), r#"<string name="">a&lt;b &amp; c&gt;d</string>"#);
}

#[test]
fn encode_empty_string_keeps_end_tag() {
    // Must not self-close, or it would read back as null.
    assert_encode(&Value::from(""), r#"<string name=""></string>"#);
}

#[test]
fn encode_string_that_looks_like_number_stays_string() {
    assert_encode(&Value::from("42"), r#"<string name="">42</string>"#);
}

#[test]
fn encode_date_as_iso8601_millis() {
    let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_encode(&Value::Date(date), r#"<date name="">2024-01-02T03:04:05.000Z</date>"#);
}

#[test]
fn encode_date_truncates_below_millis() {
    let date = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    assert_encode(&Value::Date(date), r#"<date name="">2023-11-14T22:13:20.123Z</date>"#);
}

#[test]
fn encode_date_outside_four_digit_years_is_signed() {
    let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    assert_encode(&Value::Date(far), r#"<date name="">+10000-01-01T00:00:00.000Z</date>"#);
    let bce = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
    assert_encode(&Value::Date(bce), r#"<date name="">-0001-01-01T00:00:00.000Z</date>"#);
}

#[test]
fn encode_multibyte_text_and_keys_verbatim() {
    let value: Value = [("ключ", Value::from("café ☕ 你好"))].into_iter().collect();
    assert_encode(
        &value,
        r#"<object name=""><string name="ключ">café ☕ 你好</string></object>"#,
    );
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn encode_empty_array_is_not_self_closing() {
    assert_encode(&Value::Array(vec![]), r#"<array name=""></array>"#);
}

#[test]
fn encode_empty_object_is_not_self_closing() {
    assert_encode(&Value::Object(Default::default()), r#"<object name=""></object>"#);
}

#[test]
fn encode_array_uses_index_names() {
    let value: Value = vec![Value::from("x"), Value::from(2), Value::Null].into();
    assert_encode(
        &value,
        r#"<array name=""><string name="0">x</string><number name="1">2</number><object name="2"/></array>"#,
    );
}

#[test]
fn encode_object_uses_property_names_in_order() {
    let value: Value = [("z", Value::from(1)), ("a", Value::from(2))]
        .into_iter()
        .collect();
    assert_encode(
        &value,
        r#"<object name=""><number name="z">1</number><number name="a">2</number></object>"#,
    );
}

#[test]
fn encode_nested_containers() {
    assert_encode(
        &sample_object(),
        r#"<object name=""><number name="a">1</number><array name="b"><boolean name="0">true</boolean><object name="1"/></array></object>"#,
    );
}

#[test]
fn encode_key_is_attribute_escaped() {
    let value: Value = [("a&b", Value::from(1))].into_iter().collect();
    let xml = stringify(&value).unwrap();
    assert!(xml.contains(r#"<number name="a&amp;b">1</number>"#), "got {xml}");
}

// ============================================================================
// Indentation
// ============================================================================

#[test]
fn encode_indent_two_spaces() {
    let xml = stringify_with(&sample_object(), Replacer::All, 2).unwrap();
    let expected = format!(
        "{DECL}\n\
         <object name=\"\">\n\
         \x20 <number name=\"a\">1</number>\n\
         \x20 <array name=\"b\">\n\
         \x20   <boolean name=\"0\">true</boolean>\n\
         \x20   <object name=\"1\"/>\n\
         \x20 </array>\n\
         </object>"
    );
    assert_eq!(xml, expected);
}

#[test]
fn encode_indent_empty_containers_stay_on_one_line() {
    let value: Value = [("list", Value::Array(vec![]))].into_iter().collect();
    let xml = stringify_with(&value, Replacer::All, 2).unwrap();
    assert!(xml.contains("\n  <array name=\"list\"></array>\n</object>"), "got {xml}");
}

#[test]
fn encode_indent_never_touches_scalar_text() {
    let value: Value = [("s", Value::from("  padded  "))].into_iter().collect();
    let xml = stringify_with(&value, Replacer::All, 4).unwrap();
    assert!(xml.contains(r#"<string name="s">  padded  </string>"#), "got {xml}");
}

#[test]
fn encode_indent_clamped_to_ten() {
    let value = sample_object();
    let at_25 = stringify_with(&value, Replacer::All, 25).unwrap();
    let at_10 = stringify_with(&value, Replacer::All, 10).unwrap();
    assert_eq!(at_25, at_10);
    assert!(at_10.contains(&format!("\n{}<number", " ".repeat(10))));
}

#[test]
fn encode_negative_indent_is_compact() {
    let value = sample_object();
    let negative = stringify_with(&value, Replacer::All, -1).unwrap();
    let zero = stringify_with(&value, Replacer::All, 0).unwrap();
    assert_eq!(negative, zero);
    assert_eq!(zero, stringify(&value).unwrap());
    assert!(!zero.contains('\n'));
}

#[test]
fn encode_text_indent() {
    let xml = stringify_with(&sample_object(), Replacer::All, "\t").unwrap();
    assert!(xml.contains("\n\t<number name=\"a\">1</number>"), "got {xml}");
    assert!(xml.contains("\n\t\t<boolean name=\"0\">true</boolean>"), "got {xml}");
}

#[test]
fn encode_text_indent_truncated_to_ten_chars() {
    let xml = stringify_with(&sample_object(), Replacer::All, "abcdefghijklmnop").unwrap();
    assert!(xml.contains("\nabcdefghij<number"), "got {xml}");
    assert!(!xml.contains("abcdefghijk"));
}

#[test]
fn indent_unit_normalization() {
    assert_eq!(Indent::None.unit(), "");
    assert_eq!(Indent::Spaces(3).unit(), "   ");
    assert_eq!(Indent::Spaces(-5).unit(), "");
    assert_eq!(Indent::Spaces(99).unit(), " ".repeat(10));
    assert_eq!(Indent::from("ab").unit(), "ab");
    assert_eq!(Indent::from(None::<i64>), Indent::None);
    assert_eq!(Indent::from(Some(4)), Indent::Spaces(4));
}

// ============================================================================
// Limits
// ============================================================================

fn nested_arrays(depth: usize) -> Value {
    let mut value = Value::Array(vec![]);
    for _ in 1..depth {
        value = Value::Array(vec![value]);
    }
    value
}

#[test]
fn encode_within_depth_limit() {
    let xml = Encoder::new().max_depth(5).encode(&nested_arrays(5)).unwrap();
    assert_eq!(xml.matches("<array").count(), 5);
}

#[test]
fn encode_past_depth_limit_is_cycle_detected() {
    let err = Encoder::new().max_depth(4).encode(&nested_arrays(5)).unwrap_err();
    assert!(matches!(err, XmlsonError::CycleDetected { limit: 4 }), "got {err:?}");
}

#[test]
fn encoder_builder_combines_settings() {
    let xml = Encoder::new()
        .replacer(Replacer::keys(["a"]))
        .indent(1)
        .encode(&sample_object())
        .unwrap();
    assert_eq!(
        xml,
        format!("{DECL}\n<object name=\"\">\n <number name=\"a\">1</number>\n</object>")
    );
}
