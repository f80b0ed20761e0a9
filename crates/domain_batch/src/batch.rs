//! Batch aggregate

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, Canonical, ClinicId, GuideId, Money};
use domain_guides::GuideKind;
use infra_transport::TransportMethod;

use crate::error::BatchError;
use crate::retry;

/// Batch submission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Assembled, not yet accepted by the operator
    Pending,
    /// Operator acknowledged receipt
    Submitted,
    /// Last delivery attempt failed
    Error,
}

/// A numbered lot of same-kind guides submitted as one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub clinic_id: ClinicId,
    /// `LOTE{clinic prefix}{timestamp}`, the wire-visible lot number
    pub batch_number: String,
    pub kind: GuideKind,
    /// Member guides, in assembly order
    pub guide_ids: Vec<GuideId>,
    /// Sum of the member guides' totals
    pub total: Money,
    pub tiss_version: String,
    /// Rendered envelope
    pub xml: Option<String>,
    /// Integrity hash over the canonical batch fields
    pub content_hash: String,
    pub status: SubmissionStatus,
    pub transport_method: TransportMethod,
    /// Failed delivery attempts so far
    pub retry_count: u32,
    /// Attempts allowed before the batch parks in Error for good
    pub max_retries: u32,
    pub last_retry_at: Option<DateTime<Utc>>,
    pub next_retry_at: Option<DateTime<Utc>>,
    /// Operator-assigned protocol number, set on acceptance
    pub protocol_number: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Batch {
    /// Records an accepted delivery: Pending/Error → Submitted
    pub fn record_success(&mut self, protocol_number: Option<String>) -> Result<(), BatchError> {
        if self.status == SubmissionStatus::Submitted {
            return Err(BatchError::AlreadySubmitted(self.batch_number.clone()));
        }
        self.status = SubmissionStatus::Submitted;
        self.protocol_number = protocol_number;
        self.error_message = None;
        self.next_retry_at = None;
        let now = Utc::now();
        self.sent_at = Some(now);
        self.updated_at = now;
        tracing::info!(
            batch = %self.batch_number,
            protocol = self.protocol_number.as_deref().unwrap_or("-"),
            "batch submitted"
        );
        Ok(())
    }

    /// Records a failed delivery attempt: bumps the retry counter and, while
    /// attempts remain, schedules the next one on the backoff table.
    pub fn record_failure(&mut self, error: impl Into<String>) -> Result<(), BatchError> {
        if self.status == SubmissionStatus::Submitted {
            return Err(BatchError::AlreadySubmitted(self.batch_number.clone()));
        }
        let now = Utc::now();
        self.status = SubmissionStatus::Error;
        self.error_message = Some(error.into());
        self.retry_count += 1;
        self.last_retry_at = Some(now);
        self.next_retry_at = if self.should_retry() {
            Some(retry::next_retry_time(self.retry_count, now))
        } else {
            None
        };
        self.updated_at = now;
        tracing::warn!(
            batch = %self.batch_number,
            attempt = self.retry_count,
            error = self.error_message.as_deref().unwrap_or("-"),
            "batch delivery failed"
        );
        Ok(())
    }

    /// Whether another delivery attempt may be scheduled
    pub fn should_retry(&self) -> bool {
        self.status != SubmissionStatus::Submitted && self.retry_count < self.max_retries
    }
}

impl Canonical for Batch {
    fn entity_kind(&self) -> &'static str {
        "batch"
    }

    /// Hash covers the lot number, assembly date, member set, and total.
    /// The rendered envelope is excluded; re-rendering never breaks the hash.
    fn canonical_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("batch_number".into(), self.batch_number.clone());
        fields.insert(
            "send_date".into(),
            self.created_at.format("%Y-%m-%d").to_string(),
        );
        let mut ids: Vec<String> = self.guide_ids.iter().map(|id| id.to_string()).collect();
        ids.sort();
        fields.insert("guide_ids".into(), ids.join(","));
        fields.insert("total".into(), self.total.wire_format());
        fields
    }
}
