//! # xmlson-python
//!
//! Python bindings for the xmlson encoder/decoder, built with PyO3.
//!
//! Exposes the following functions to Python as the `xmlson` module:
//!
//! - `parse(xml)` -- XML string -> JSON string
//! - `stringify(json, keys=None, indent=None)` -- JSON string -> XML string

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use xmlson_core::{Indent, Replacer};

/// Decode an XML document into JSON.
///
/// Args:
///     xml: An XML document using the typed element vocabulary.
///
/// Returns:
///     The compact JSON string. Dates are ISO 8601 strings.
///
/// Raises:
///     ValueError: If the XML is malformed or element text cannot be
///         converted to its tagged type.
#[pyfunction]
fn parse(xml: &str) -> PyResult<String> {
    xmlson_core::decode_json(xml).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Encode a JSON string as an XML document.
///
/// Args:
///     json: A valid JSON string.
///     keys: Optional list of property names to keep at every level.
///     indent: Optional number of spaces per level (clamped to 0..=10).
///
/// Returns:
///     The XML document.
///
/// Raises:
///     ValueError: If the input is not valid JSON or encoding fails.
#[pyfunction]
#[pyo3(signature = (json, keys=None, indent=None))]
fn stringify(json: &str, keys: Option<Vec<String>>, indent: Option<i64>) -> PyResult<String> {
    let replacer = keys.map_or(Replacer::All, Replacer::Keys);
    xmlson_core::encode_json(json, replacer, Indent::from(indent))
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// The `xmlson` Python module, implemented in Rust via PyO3.
#[pymodule]
fn xmlson(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(stringify, m)?)?;
    Ok(())
}
