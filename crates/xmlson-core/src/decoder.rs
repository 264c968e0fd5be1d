//! XML Decoder — rebuilds a [`Value`] tree from XML text.
//!
//! The decoder pulls events from `quick_xml::Reader` and keeps an explicit
//! stack of frames, one per open element. Container frames (`array` and
//! any unrecognized tag, which reads as an object) collect their children;
//! scalar frames (`date`, `number`, `string`, `boolean`) buffer text. When
//! an element closes its frame becomes a value and is stored under the
//! element's `name` attribute in the enclosing frame, so the tree is built
//! bottom-up. Self-closing elements are `Null`.
//!
//! The root element's `name` is the logical top-level key; the decoded
//! result is the value stored under it.
//!
//! # Example
//! ```
//! use xmlson_core::{parse, Value};
//! let xml = r#"<object name=""><number name="a">1</number></object>"#;
//! let value = parse(xml).unwrap();
//! assert_eq!(value.get("a"), Some(&Value::Number(1.0)));
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::escape::{resolve_xml_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};

use crate::error::{Result, XmlsonError};
use crate::transform;
use crate::types::{Key, Map, Tag, Value};
use crate::DEFAULT_MAX_DEPTH;

/// Decode an XML document produced by [`crate::stringify`] into a value.
pub fn parse(xml: &str) -> Result<Value> {
    Decoder::new().decode(xml)
}

/// Decode an XML document, passing every entry through `reviver`.
///
/// The reviver is called first for the root as `(Key::Name(root_key), value)`
/// and then for each container entry, parent before children. Returning
/// `None` drops the entry; dropped array entries are compacted away.
pub fn parse_with<F>(xml: &str, reviver: F) -> Result<Value>
where
    F: FnMut(&Key, Value) -> Option<Value>,
{
    Decoder::new().decode_with(xml, reviver)
}

/// Configurable decoder.
#[derive(Debug, Clone)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Maximum container nesting accepted in the document and produced by
    /// the reviver.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn decode(&self, xml: &str) -> Result<Value> {
        let (_, value) = self.build(xml)?;
        Ok(value)
    }

    pub fn decode_with<F>(&self, xml: &str, mut reviver: F) -> Result<Value>
    where
        F: FnMut(&Key, Value) -> Option<Value>,
    {
        let (root_key, value) = self.build(xml)?;
        match reviver(&Key::Name(root_key), value) {
            Some(kept) => transform::walk(kept, &mut reviver, self.max_depth),
            // Nothing survives; there is no "undefined" to hand back.
            None => Ok(Value::Null),
        }
    }

    /// Run the parser to completion and return `(root_key, root_value)`.
    fn build(&self, xml: &str) -> Result<(String, Value)> {
        debug!(input_len = xml.len(), "decoding XML document");

        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<(String, Value)> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => return Err(parse_error(reader.error_position() as u64, e)),
            };
            let position = reader.buffer_position() as u64;

            match event {
                Event::Start(start) => {
                    let name = entry_name(&reader, &start)?;
                    let tag = Tag::from_name(start.name().as_ref());
                    check_can_open(&stack, &root, position)?;
                    trace!(%tag, name = %name, depth = stack.len(), "open element");

                    let frame = match ScalarKind::from_tag(tag) {
                        Some(kind) => Frame::Scalar {
                            kind,
                            name,
                            text: String::new(),
                        },
                        None => {
                            if stack.len() >= self.max_depth {
                                return Err(parse_error(
                                    position,
                                    format!("nesting exceeds {} levels", self.max_depth),
                                ));
                            }
                            if tag == Tag::Array {
                                Frame::Array {
                                    name,
                                    items: Vec::new(),
                                }
                            } else {
                                Frame::Object {
                                    name,
                                    map: Map::new(),
                                }
                            }
                        }
                    };
                    stack.push(frame);
                }
                Event::Empty(start) => {
                    let name = entry_name(&reader, &start)?;
                    check_can_open(&stack, &root, position)?;
                    trace!(name = %name, "self-closing element is null");
                    store(&mut stack, &mut root, name, Value::Null, position)?;
                }
                Event::Text(text) => {
                    if let Some(Frame::Scalar { text: buf, .. }) = stack.last_mut() {
                        let raw = std::str::from_utf8(&text)
                            .map_err(|e| parse_error(position, e))?;
                        let unescaped = unescape(raw).map_err(|e| parse_error(position, e))?;
                        buf.push_str(&unescaped);
                    }
                }
                Event::CData(data) => {
                    if let Some(Frame::Scalar { text: buf, .. }) = stack.last_mut() {
                        let raw = std::str::from_utf8(&data)
                            .map_err(|e| parse_error(position, e))?;
                        buf.push_str(raw);
                    }
                }
                Event::GeneralRef(reference) => {
                    if let Some(Frame::Scalar { text: buf, .. }) = stack.last_mut() {
                        let raw = std::str::from_utf8(&reference)
                            .map_err(|e| parse_error(position, e))?;
                        buf.push_str(&resolve_reference(raw, position)?);
                    }
                }
                Event::End(_) => {
                    let frame = stack.pop().ok_or_else(|| {
                        parse_error(position, "closing tag without matching open tag")
                    })?;
                    let (name, value) = frame.finish()?;
                    trace!(name = %name, depth = stack.len(), "close element");
                    store(&mut stack, &mut root, name, value, position)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and DTDs
                // carry nothing for the value tree.
                _ => {}
            }
        }

        let position = reader.buffer_position() as u64;
        if let Some(open) = stack.last() {
            return Err(parse_error(
                position,
                format!("unexpected end of input inside element {:?}", open.name()),
            ));
        }
        let (root_key, value) =
            root.ok_or_else(|| parse_error(position, "document has no root element"))?;
        debug!(root_key = %root_key, tag = %value.tag(), "decoded XML document");
        Ok((root_key, value))
    }
}

/// One open element on the decoder stack.
enum Frame {
    Scalar {
        kind: ScalarKind,
        name: String,
        text: String,
    },
    Array {
        name: String,
        items: Vec<Value>,
    },
    Object {
        name: String,
        map: Map,
    },
}

impl Frame {
    fn name(&self) -> &str {
        match self {
            Frame::Scalar { name, .. } | Frame::Array { name, .. } | Frame::Object { name, .. } => {
                name
            }
        }
    }

    /// Turn a closed element into the `(key, value)` its parent stores.
    fn finish(self) -> Result<(String, Value)> {
        match self {
            Frame::Scalar { kind, name, text } => {
                let value = kind.convert(&name, text)?;
                Ok((name, value))
            }
            Frame::Array { name, items } => Ok((name, Value::Array(items))),
            Frame::Object { name, map } => Ok((name, Value::Object(map))),
        }
    }
}

/// Tags whose element text is the value.
#[derive(Debug, Clone, Copy)]
enum ScalarKind {
    Date,
    Number,
    String,
    Boolean,
}

impl ScalarKind {
    fn from_tag(tag: Tag) -> Option<Self> {
        match tag {
            Tag::Date => Some(ScalarKind::Date),
            Tag::Number => Some(ScalarKind::Number),
            Tag::String => Some(ScalarKind::String),
            Tag::Boolean => Some(ScalarKind::Boolean),
            Tag::Array | Tag::Object => None,
        }
    }

    fn tag(self) -> Tag {
        match self {
            ScalarKind::Date => Tag::Date,
            ScalarKind::Number => Tag::Number,
            ScalarKind::String => Tag::String,
            ScalarKind::Boolean => Tag::Boolean,
        }
    }

    fn convert(self, name: &str, text: String) -> Result<Value> {
        let value = match self {
            ScalarKind::String => return Ok(Value::String(text)),
            ScalarKind::Boolean => return Ok(Value::Boolean(text == "true")),
            ScalarKind::Number => parse_number(&text).map(Value::Number),
            ScalarKind::Date => parse_date(&text).map(Value::Date),
        };
        value.ok_or_else(|| XmlsonError::TypeCoercion {
            tag: self.tag().as_str(),
            name: name.to_string(),
            text,
        })
    }
}

/// Parse number text: decimal or exponent notation, plus the non-finite
/// spellings the encoder writes. Anything else is rejected rather than
/// becoming NaN.
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        "NaN" => return Some(f64::NAN),
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    // `f64::from_str` also takes "inf" and "nan"; keep to plain numerals.
    let numeral = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if text.is_empty() || !numeral {
        return None;
    }
    text.parse().ok()
}

/// Parse an ISO-8601 timestamp. Offsets are normalized to UTC; timestamps
/// without an offset and bare dates are taken as UTC.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    // RFC 3339 only allows four-digit years; `%Y` also takes the signed,
    // expanded years written for dates outside 0..=9999.
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    let local = text.strip_suffix('Z').unwrap_or(text);
    if let Ok(naive) = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Read the `name` attribute; a missing attribute is the empty key.
fn entry_name(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(reader.buffer_position() as u64, e))?;
        if attr.key.as_ref() == b"name" {
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| parse_error(reader.buffer_position() as u64, e))?;
            return Ok(value.into_owned());
        }
    }
    Ok(String::new())
}

/// Reject elements nested inside scalars and a second root element.
fn check_can_open(stack: &[Frame], root: &Option<(String, Value)>, position: u64) -> Result<()> {
    match stack.last() {
        Some(Frame::Scalar { kind, name, .. }) => Err(parse_error(
            position,
            format!("element nested inside <{}> {:?}", kind.tag(), name),
        )),
        Some(_) => Ok(()),
        None if root.is_some() => Err(parse_error(position, "more than one root element")),
        None => Ok(()),
    }
}

/// Store a finished value into the innermost open container, or make it
/// the root when no element is open.
fn store(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
    position: u64,
) -> Result<()> {
    match stack.last_mut() {
        Some(Frame::Object { map, .. }) => {
            map.insert(name, value);
            Ok(())
        }
        Some(Frame::Array { items, .. }) => {
            let index: usize = name.parse().map_err(|_| {
                parse_error(position, format!("array entry name {name:?} is not an index"))
            })?;
            match index.cmp(&items.len()) {
                std::cmp::Ordering::Less => items[index] = value,
                std::cmp::Ordering::Equal => items.push(value),
                std::cmp::Ordering::Greater => {
                    return Err(parse_error(
                        position,
                        format!("array entry {index} skips positions (array has {})", items.len()),
                    ));
                }
            }
            Ok(())
        }
        Some(Frame::Scalar { kind, .. }) => Err(parse_error(
            position,
            format!("element nested inside <{}>", kind.tag()),
        )),
        None => {
            *root = Some((name, value));
            Ok(())
        }
    }
}

/// Resolve `&name;` / `&#N;` / `&#xN;` references reported by the reader.
fn resolve_reference(raw: &str, position: u64) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }
    let code = match raw.strip_prefix('#') {
        Some(rest) => match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => rest.parse::<u32>().ok(),
        },
        None => None,
    };
    code.and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| parse_error(position, format!("unknown entity reference &{raw};")))
}

fn parse_error(position: u64, err: impl std::fmt::Display) -> XmlsonError {
    XmlsonError::Parse {
        position,
        message: err.to_string(),
    }
}
