//! Storage errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: String },

    #[error(transparent)]
    Batch(#[from] domain_batch::BatchError),

    #[error(transparent)]
    Guide(#[from] domain_guides::GuideError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn duplicate(entity: &'static str, id: impl ToString) -> Self {
        StoreError::Duplicate {
            entity,
            id: id.to_string(),
        }
    }
}
