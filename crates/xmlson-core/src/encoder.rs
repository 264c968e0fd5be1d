//! XML Encoder — writes a [`Value`] tree as an XML document.
//!
//! Every value becomes one element whose tag names its type and whose
//! `name` attribute holds the key it is stored under:
//!
//! - `Null` → `<object name="k"/>` (self-closing, nothing else is)
//! - `Boolean` → `<boolean name="k">true</boolean>`
//! - `Number` → `<number name="k">1.5</number>`
//! - `String` → `<string name="k">text</string>`
//! - `Date` → `<date name="k">2024-01-02T03:04:05.000Z</date>`
//! - `Array` → `<array name="k">` with children named `0`, `1`, …
//! - `Object` → `<object name="k">` with children named by property
//!
//! The root element is named with the empty key. Before anything is
//! written the value is cloned once and passed through the
//! [`Replacer`], so the writer only ever sees the filtered snapshot.
//!
//! # Example
//! ```
//! use xmlson_core::{stringify, Value};
//! let value: Value = vec![Value::from(1), Value::Null].into();
//! let xml = stringify(&value).unwrap();
//! assert_eq!(
//!     xml,
//!     r#"<?xml version="1.0" encoding="UTF-8"?><array name=""><number name="0">1</number><object name="1"/></array>"#
//! );
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::error::{Result, XmlsonError};
use crate::transform::{self, Replacer};
use crate::types::{format_date, Key, Value};
use crate::DEFAULT_MAX_DEPTH;

/// Longest indentation unit accepted, in spaces or characters.
const MAX_INDENT: usize = 10;

/// Encode a value as compact XML, keeping every entry.
pub fn stringify(value: &Value) -> Result<String> {
    Encoder::new().encode(value)
}

/// Encode a value, filtering entries through `replacer` and indenting
/// nested elements by `space`.
pub fn stringify_with(
    value: &Value,
    replacer: Replacer<'_>,
    space: impl Into<Indent>,
) -> Result<String> {
    Encoder::new().replacer(replacer).indent(space).encode(value)
}

/// Indentation setting for encoded output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Indent {
    /// Compact output on a single line.
    #[default]
    None,
    /// That many spaces per level, clamped to `0..=10`.
    Spaces(i64),
    /// The given text per level, truncated to its first 10 characters.
    Text(String),
}

impl Indent {
    /// The per-level indentation string; empty means compact output.
    pub fn unit(&self) -> String {
        match self {
            Indent::None => String::new(),
            Indent::Spaces(n) => " ".repeat((*n).clamp(0, MAX_INDENT as i64) as usize),
            Indent::Text(text) => text.chars().take(MAX_INDENT).collect(),
        }
    }
}

impl From<i64> for Indent {
    fn from(n: i64) -> Self {
        Indent::Spaces(n)
    }
}

impl From<i32> for Indent {
    fn from(n: i32) -> Self {
        Indent::Spaces(i64::from(n))
    }
}

impl From<&str> for Indent {
    fn from(text: &str) -> Self {
        Indent::Text(text.to_string())
    }
}

impl From<String> for Indent {
    fn from(text: String) -> Self {
        Indent::Text(text)
    }
}

impl<T: Into<Indent>> From<Option<T>> for Indent {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Indent::None, Into::into)
    }
}

/// Configurable encoder.
#[derive(Debug)]
pub struct Encoder<'a> {
    replacer: Replacer<'a>,
    indent: Indent,
    max_depth: usize,
}

impl Default for Encoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Encoder<'a> {
    pub fn new() -> Self {
        Self {
            replacer: Replacer::All,
            indent: Indent::None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn replacer(mut self, replacer: Replacer<'a>) -> Self {
        self.replacer = replacer;
        self
    }

    pub fn indent(mut self, indent: impl Into<Indent>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Maximum container nesting; deeper trees fail with
    /// [`XmlsonError::CycleDetected`].
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn encode(&mut self, value: &Value) -> Result<String> {
        let max_depth = self.max_depth;
        let replacer = &mut self.replacer;
        let mut hook = |key: &Key, entry: Value| replacer.apply(key, entry);
        // The replacer is not consulted for the root itself.
        let snapshot = transform::walk(value.clone(), &mut hook, max_depth)?;

        let mut emitter = Emitter {
            writer: Writer::new(Vec::new()),
            indent: self.indent.unit(),
            max_depth,
        };
        emitter.write_document(&snapshot)?;
        // Every byte came from a `&str`, so the lossy path never replaces anything.
        let xml = String::from_utf8(emitter.writer.into_inner())
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        debug!(output_len = xml.len(), tag = %snapshot.tag(), "encoded XML document");
        Ok(xml)
    }
}

/// Drives the XML writer over an already-filtered tree.
struct Emitter {
    writer: Writer<Vec<u8>>,
    /// Per-level indentation; empty for compact output.
    indent: String,
    max_depth: usize,
}

impl Emitter {
    fn write_document(&mut self, root: &Value) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.line_break(0)?;
        self.write_entry("", root, 0)
    }

    fn write_entry(&mut self, name: &str, value: &Value, depth: usize) -> Result<()> {
        let tag = value.tag().as_str();
        let mut start = BytesStart::new(tag);
        start.push_attribute(("name", name));

        match value {
            Value::Null => {
                self.writer.write_event(Event::Empty(start))?;
            }
            Value::Boolean(b) => {
                self.write_scalar(start, tag, if *b { "true" } else { "false" })?;
            }
            Value::Number(n) => self.write_scalar(start, tag, &format_number(*n))?,
            Value::String(s) => self.write_scalar(start, tag, s)?,
            Value::Date(d) => self.write_scalar(start, tag, &format_date(d))?,
            Value::Array(items) => {
                self.check_depth(depth)?;
                self.writer.write_event(Event::Start(start))?;
                for (index, item) in items.iter().enumerate() {
                    self.line_break(depth + 1)?;
                    self.write_entry(&index.to_string(), item, depth + 1)?;
                }
                self.close_container(tag, !items.is_empty(), depth)?;
            }
            Value::Object(map) => {
                self.check_depth(depth)?;
                self.writer.write_event(Event::Start(start))?;
                for (key, entry) in map {
                    self.line_break(depth + 1)?;
                    self.write_entry(key, entry, depth + 1)?;
                }
                self.close_container(tag, !map.is_empty(), depth)?;
            }
        }
        Ok(())
    }

    /// Scalars always get an explicit end tag, even with empty text, so
    /// they never read back as null.
    fn write_scalar(&mut self, start: BytesStart<'_>, tag: &str, text: &str) -> Result<()> {
        self.writer.write_event(Event::Start(start))?;
        if !text.is_empty() {
            self.writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn close_container(&mut self, tag: &str, had_children: bool, depth: usize) -> Result<()> {
        if had_children {
            self.line_break(depth)?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// Newline plus `depth` indentation units. Only whitespace between
    /// container children is affected; scalar text is never indented.
    fn line_break(&mut self, depth: usize) -> Result<()> {
        if self.indent.is_empty() {
            return Ok(());
        }
        let mut ws = String::with_capacity(1 + self.indent.len() * depth);
        ws.push('\n');
        for _ in 0..depth {
            ws.push_str(&self.indent);
        }
        self.writer.write_event(Event::Text(BytesText::new(&ws)))?;
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(XmlsonError::CycleDetected {
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}

/// Decimal text for a number. Rust's shortest round-trip formatting never
/// uses exponents, so `1.0` is `1` and `1e21` is spelled out in full.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        n.to_string()
    }
}
