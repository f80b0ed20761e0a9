//! Storage Adapters
//!
//! Ports ([`ports`]) for guides, batches, and the append-only audit trail,
//! plus in-memory implementations ([`memory`]) used by tests and
//! single-process deployments.

pub mod audit;
pub mod error;
pub mod memory;
pub mod ports;

pub use audit::{AuditAction, AuditEntry};
pub use error::StoreError;
pub use memory::{MemoryAuditLog, MemoryBatchStore, MemoryGuideStore};
pub use ports::{AuditLog, BatchStore, BatchUpdate, GuideStore};
