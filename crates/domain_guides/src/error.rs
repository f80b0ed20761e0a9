//! Guide domain errors

use thiserror::Error;

/// Errors that can occur in the guide domain
///
/// Validation errors are never retried automatically; the payload must be
/// fixed and resubmitted. State errors are always fatal to the call.
#[derive(Debug, Error)]
pub enum GuideError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required block: {0}")]
    MissingBlock(&'static str),

    #[error("Declared total {declared} does not match line item total {computed}")]
    TotalMismatch { declared: String, computed: String },

    #[error("Detail block does not match guide kind {kind}")]
    DetailKindMismatch { kind: String },

    #[error("Guide {0} is locked and cannot be modified")]
    AlreadyLocked(String),

    #[error("Failed to render guide XML: {0}")]
    Render(String),
}

impl GuideError {
    pub fn validation(message: impl Into<String>) -> Self {
        GuideError::Validation(message.into())
    }
}
