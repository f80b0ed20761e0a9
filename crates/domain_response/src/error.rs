//! Response parsing errors

use thiserror::Error;

use wire_format::WireError;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML. Missing fields are never an
    /// error here; operators fill these documents inconsistently, so absent
    /// data surfaces as `None` and is judged by `validate()`.
    #[error("malformed response at line {line}, column {column}: {message}")]
    Malformed {
        line: u32,
        column: u32,
        message: String,
    },
}

impl From<WireError> for ParseError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Malformed {
                line,
                column,
                message,
            } => ParseError::Malformed {
                line,
                column,
                message,
            },
            other => ParseError::Malformed {
                line: 0,
                column: 0,
                message: other.to_string(),
            },
        }
    }
}
