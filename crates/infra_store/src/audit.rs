//! Audit trail records
//!
//! Every state change on a guide or batch leaves an entry. The log port only
//! exposes append and read; entries are immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::AuditEntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Lock,
    Submit,
    Parse,
    Retry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    /// Who triggered the change (user identifier or system component)
    pub actor: String,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    /// Structured before/after or context data
    pub changes: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: impl Into<String>,
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        changes: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: AuditEntryId::new_v7(),
            actor: actor.into(),
            action,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            changes,
            occurred_at: Utc::now(),
        }
    }
}
