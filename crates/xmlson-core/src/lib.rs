//! # xmlson-core
//!
//! Pure-Rust encoder and decoder between a JSON-like value model and XML.
//!
//! Plain XML text loses type information, so every value is written as one
//! element whose **tag names its type** (`date`, `number`, `string`,
//! `boolean`, `array`, `object`) and whose `name` attribute records the key
//! it lives under. `null` is a self-closing element. Decoding reads the tags
//! back into a typed [`Value`] tree.
//!
//! Both directions accept a per-entry hook, in the manner of
//! `JSON.parse`/`JSON.stringify`: a *reviver* on decode and a *replacer*
//! on encode. Returning `None` from either drops the entry.
//!
//! ## Quick start
//!
//! ```rust
//! use xmlson_core::{parse, stringify_with, Replacer, Value};
//!
//! let value: Value = [
//!     ("a", Value::from(1)),
//!     ("b", Value::from(false)),
//!     ("c", Value::from("x")),
//! ]
//! .into_iter()
//! .collect();
//!
//! // Value → XML
//! let xml = stringify_with(&value, Replacer::All, 2).unwrap();
//! assert!(xml.contains(r#"<number name="a">1</number>"#));
//!
//! // XML → Value (roundtrip)
//! assert_eq!(parse(&xml).unwrap(), value);
//! ```
//!
//! ## Modules
//!
//! - [`encoder`] — `Value` → XML string
//! - [`decoder`] — XML string → `Value`
//! - [`json`] — JSON text in, JSON text out
//! - [`transform`] — reviver/replacer tree walk and [`Replacer`]
//! - [`types`] — the [`Value`] model, [`Key`] and [`Tag`]
//! - [`error`] — Error types for parse/encode failures

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod json;
pub mod transform;
pub mod types;

pub use decoder::{parse, parse_with, Decoder};
pub use encoder::{stringify, stringify_with, Encoder, Indent};
pub use error::{Result, XmlsonError};
pub use json::{decode_json, encode_json};
pub use transform::Replacer;
pub use types::{Key, Map, Tag, Value};

/// Default limit on container nesting, for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 512;
