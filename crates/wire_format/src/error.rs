//! Wire format errors

use thiserror::Error;

/// Errors raised by wire-format operations
///
/// Document invalidity is never an error: the XSD validator reports violations
/// as data. `Malformed` is reserved for input that does not parse as XML at
/// all, which inbound-response callers surface as `MalformedDocumentError`.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed XML at line {line}, column {column}: {message}")]
    Malformed {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Failed to render XML: {0}")]
    Render(String),

    #[error("Unsupported TISS version: {0}")]
    UnsupportedVersion(String),

    #[error("Schema artifact unreadable at {path}: {message}")]
    SchemaUnreadable { path: String, message: String },
}

impl From<quick_xml::Error> for WireError {
    fn from(err: quick_xml::Error) -> Self {
        WireError::Render(err.to_string())
    }
}

impl From<std::io::Error> for WireError {
    fn from(err: std::io::Error) -> Self {
        WireError::Render(err.to_string())
    }
}
