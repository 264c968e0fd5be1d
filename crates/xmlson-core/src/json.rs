//! JSON text bridge used by the CLI and the language bindings.
//!
//! JSON has no date type, so dates leave as ISO-8601 strings and come back
//! in as strings. Non-finite numbers leave as `null`.

use crate::encoder::{stringify_with, Indent};
use crate::error::Result;
use crate::transform::Replacer;
use crate::types::Value;

/// Encode a JSON string as XML.
///
/// ```rust
/// let xml = xmlson_core::json::encode_json(r#"[true]"#, Default::default(), None::<i64>).unwrap();
/// assert!(xml.ends_with(r#"<array name=""><boolean name="0">true</boolean></array>"#));
/// ```
pub fn encode_json(json: &str, replacer: Replacer<'_>, indent: impl Into<Indent>) -> Result<String> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    stringify_with(&Value::from(parsed), replacer, indent)
}

/// Decode XML into compact JSON text.
pub fn decode_json(xml: &str) -> Result<String> {
    let value = crate::decoder::parse(xml)?;
    Ok(serde_json::to_string(&value.to_json())?)
}
