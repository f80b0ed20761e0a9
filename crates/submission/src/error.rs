//! Submission service errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Guide(#[from] domain_guides::GuideError),

    #[error(transparent)]
    Batch(#[from] domain_batch::BatchError),

    #[error(transparent)]
    Store(#[from] infra_store::StoreError),

    #[error(transparent)]
    Parse(#[from] domain_response::ParseError),

    #[error(transparent)]
    Wire(#[from] wire_format::WireError),

    #[error("integrity check failed for {entity} {id}")]
    IntegrityViolation { entity: &'static str, id: String },

    #[error("batch {0} has no rendered envelope")]
    MissingEnvelope(String),

    #[error("batch {batch_number} failed schema validation: {summary}")]
    SchemaInvalid { batch_number: String, summary: String },

    #[error("batch {0} has exhausted its retry budget")]
    RetriesExhausted(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}
