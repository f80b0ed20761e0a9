//! In-memory adapters
//!
//! Process-local implementations of the storage ports. Batches sit behind a
//! per-batch mutex so submission updates serialize; the audit log is a plain
//! append vector.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use core_kernel::{BatchId, ClinicId, GuideId};
use domain_batch::Batch;
use domain_guides::Guide;

use crate::audit::AuditEntry;
use crate::error::StoreError;
use crate::ports::{AuditLog, BatchStore, BatchUpdate, GuideStore};

#[derive(Default)]
pub struct MemoryGuideStore {
    guides: RwLock<HashMap<GuideId, Guide>>,
}

impl MemoryGuideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GuideStore for MemoryGuideStore {
    async fn insert(&self, guide: Guide) -> Result<(), StoreError> {
        let mut guides = self.guides.write().await;
        if guides.contains_key(&guide.id) {
            return Err(StoreError::duplicate("guide", guide.id));
        }
        guides.insert(guide.id, guide);
        Ok(())
    }

    async fn get(&self, id: GuideId) -> Result<Guide, StoreError> {
        self.guides
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("guide", id))
    }

    async fn get_many(&self, ids: &[GuideId]) -> Result<Vec<Guide>, StoreError> {
        let guides = self.guides.read().await;
        ids.iter()
            .map(|id| {
                guides
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::not_found("guide", id))
            })
            .collect()
    }

    async fn update(&self, guide: Guide) -> Result<(), StoreError> {
        let mut guides = self.guides.write().await;
        if !guides.contains_key(&guide.id) {
            return Err(StoreError::not_found("guide", guide.id));
        }
        guides.insert(guide.id, guide);
        Ok(())
    }

    async fn list_for_clinic(&self, clinic_id: ClinicId) -> Result<Vec<Guide>, StoreError> {
        Ok(self
            .guides
            .read()
            .await
            .values()
            .filter(|g| g.clinic_id == clinic_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryBatchStore {
    batches: RwLock<HashMap<BatchId, Arc<Mutex<Batch>>>>,
}

impl MemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: BatchId) -> Result<Arc<Mutex<Batch>>, StoreError> {
        self.batches
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("batch", id))
    }
}

#[async_trait]
impl BatchStore for MemoryBatchStore {
    async fn insert(&self, batch: Batch) -> Result<(), StoreError> {
        let mut batches = self.batches.write().await;
        if batches.contains_key(&batch.id) {
            return Err(StoreError::duplicate("batch", batch.id));
        }
        batches.insert(batch.id, Arc::new(Mutex::new(batch)));
        Ok(())
    }

    async fn get(&self, id: BatchId) -> Result<Batch, StoreError> {
        let entry = self.entry(id).await?;
        let batch = entry.lock().await;
        Ok(batch.clone())
    }

    async fn update_submission(
        &self,
        id: BatchId,
        update: BatchUpdate,
    ) -> Result<Batch, StoreError> {
        let entry = self.entry(id).await?;
        let mut batch = entry.lock().await;
        match update {
            BatchUpdate::RecordSuccess { protocol_number } => {
                batch.record_success(protocol_number)?;
            }
            BatchUpdate::RecordFailure { error } => {
                batch.record_failure(error)?;
            }
        }
        Ok(batch.clone())
    }

    async fn due_for_retry(&self, now: DateTime<Utc>) -> Result<Vec<Batch>, StoreError> {
        let batches = self.batches.read().await;
        let mut due = Vec::new();
        for entry in batches.values() {
            let batch = entry.lock().await;
            if batch.should_retry() && batch.next_retry_at.is_some_and(|at| at <= now) {
                due.push(batch.clone());
            }
        }
        Ok(due)
    }
}

#[derive(Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn entries_for(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
