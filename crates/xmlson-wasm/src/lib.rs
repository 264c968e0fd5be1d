//! WASM bindings for xmlson-core.
//!
//! Exposes `parse` and `stringify` as `#[wasm_bindgen]` functions that can be
//! called from JavaScript/TypeScript. Values cross the boundary as JSON text,
//! so JavaScript callers pair them with `JSON.parse`/`JSON.stringify`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p xmlson-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/xmlson_wasm.wasm
//! ```

use wasm_bindgen::prelude::*;
use xmlson_core::{Indent, Replacer};

/// Decode an XML document into compact JSON.
///
/// Dates come back as ISO-8601 strings. Throws a JS error if the XML is
/// malformed or a typed element holds unconvertible text.
#[wasm_bindgen]
pub fn parse(xml: &str) -> std::result::Result<String, JsValue> {
    xmlson_core::decode_json(xml).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a JSON string as an XML document.
///
/// `indent` is a space count clamped to `0..=10`; omit it for compact
/// output. Throws a JS error if the input is not valid JSON.
#[wasm_bindgen]
pub fn stringify(json: &str, indent: Option<i32>) -> std::result::Result<String, JsValue> {
    xmlson_core::encode_json(json, Replacer::All, Indent::from(indent))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
