//! Batch domain errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch requires at least one guide")]
    Empty,

    #[error("batch holds {count} guides, limit is {max}")]
    LimitExceeded { count: usize, max: usize },

    #[error("guide {guide_number} belongs to another clinic")]
    WrongClinic { guide_number: String },

    #[error("guide {guide_number} is {found}, batch is {expected}")]
    KindMismatch {
        guide_number: String,
        expected: String,
        found: String,
    },

    #[error("guide {guide_number} targets version {found}, batch targets {expected}")]
    VersionMismatch {
        guide_number: String,
        expected: String,
        found: String,
    },

    #[error("guide {0} is locked and cannot join a new batch")]
    GuideLocked(String),

    #[error("guide {0} has no rendered body")]
    MissingBody(String),

    #[error("guide {guide_number} declares total {declared}, line items sum to {computed}")]
    TotalMismatch {
        guide_number: String,
        declared: String,
        computed: String,
    },

    #[error("guide {0} failed integrity verification")]
    TamperedGuide(String),

    #[error("batch {0} is already submitted")]
    AlreadySubmitted(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Wire(#[from] wire_format::WireError),
}

impl BatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        BatchError::Validation(message.into())
    }
}
