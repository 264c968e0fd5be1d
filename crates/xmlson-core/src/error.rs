//! Error types for XML encoding and decoding operations.

use thiserror::Error;

/// Errors that can occur during XML encoding or decoding.
#[derive(Error, Debug)]
pub enum XmlsonError {
    /// The input was not well-formed XML, or its structure could not be
    /// placed into a value tree (decoding path).
    /// `position` is the byte offset where the problem was detected.
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// Element text could not be converted under its type tag,
    /// e.g. `<number name="n">abc</number>`.
    #[error("cannot read {text:?} as {tag} (entry {name:?})")]
    TypeCoercion {
        tag: &'static str,
        name: String,
        text: String,
    },

    /// Value nesting grew past the configured limit. Owned value trees
    /// cannot hold reference cycles, so this is what a self-referential
    /// replacer or reviver looks like.
    #[error("value nesting exceeded {limit} levels; a transform is likely self-referential")]
    CycleDetected { limit: usize },

    /// JSON bridge failure (conversion helpers, CLI and bindings).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The XML writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout xmlson-core.
pub type Result<T> = std::result::Result<T, XmlsonError>;
