//! Storage ports
//!
//! Async traits the submission service depends on. The in-memory adapters in
//! [`crate::memory`] implement them for tests and single-process use; a
//! database adapter slots in behind the same traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{BatchId, ClinicId, GuideId};
use domain_batch::Batch;
use domain_guides::Guide;

use crate::audit::AuditEntry;
use crate::error::StoreError;

/// Mutation applied to a batch's submission state.
///
/// Implementations must apply the update atomically per batch: two concurrent
/// updates to the same batch serialize, so retry counters never lose writes.
#[derive(Debug, Clone)]
pub enum BatchUpdate {
    RecordSuccess { protocol_number: Option<String> },
    RecordFailure { error: String },
}

#[async_trait]
pub trait GuideStore: Send + Sync {
    async fn insert(&self, guide: Guide) -> Result<(), StoreError>;
    async fn get(&self, id: GuideId) -> Result<Guide, StoreError>;
    /// Loads all requested guides; missing ids fail the whole load
    async fn get_many(&self, ids: &[GuideId]) -> Result<Vec<Guide>, StoreError>;
    async fn update(&self, guide: Guide) -> Result<(), StoreError>;
    async fn list_for_clinic(&self, clinic_id: ClinicId) -> Result<Vec<Guide>, StoreError>;
}

#[async_trait]
pub trait BatchStore: Send + Sync {
    async fn insert(&self, batch: Batch) -> Result<(), StoreError>;
    async fn get(&self, id: BatchId) -> Result<Batch, StoreError>;
    /// Applies the update under the batch's own lock and returns the new state
    async fn update_submission(
        &self,
        id: BatchId,
        update: BatchUpdate,
    ) -> Result<Batch, StoreError>;
    /// Batches whose next retry time has passed
    async fn due_for_retry(&self, now: DateTime<Utc>) -> Result<Vec<Batch>, StoreError>;
}

/// Append-only by construction: no update or delete exists on this port
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError>;
    async fn entries_for(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError>;
}
