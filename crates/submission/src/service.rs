//! Submission orchestration
//!
//! Ties the domain layers together: guide creation, batch assembly, validated
//! delivery with retry accounting, and response ingestion. Every state change
//! leaves an audit entry.

use std::sync::Arc;

use core_kernel::{verify_integrity, BatchId, ClinicId, GuideId};
use domain_batch::{Batch, BatchAssembler};
use domain_guides::{Guide, GuideBuilder, GuideKind, GuidePayload};
use domain_response::{
    DenialInterpreter, DenialRecord, DenialSummary, Interpretation, PaymentParser,
    PaymentStatement, ProtocolParser, ProtocolReceipt, ReturnStatement, StatementParser,
};
use infra_store::{AuditAction, AuditEntry, AuditLog, BatchStore, BatchUpdate, GuideStore};
use infra_transport::{
    BatchDispatch, EndpointConfig, SenderFactory, TransportMethod, TransportSender,
};
use wire_format::{VersionRegistry, XsdValidator};

use crate::config::SubmissionConfig;
use crate::error::SubmissionError;

pub struct SubmissionService {
    guides: Arc<dyn GuideStore>,
    batches: Arc<dyn BatchStore>,
    audit: Arc<dyn AuditLog>,
    builder: GuideBuilder,
    validator: XsdValidator,
    actor: String,
}

impl SubmissionService {
    pub fn new(
        config: &SubmissionConfig,
        guides: Arc<dyn GuideStore>,
        batches: Arc<dyn BatchStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let registry = Arc::new(VersionRegistry::new(config.schema_dir.clone()));
        Self {
            guides,
            batches,
            audit,
            builder: GuideBuilder::new(Arc::clone(&registry)),
            validator: XsdValidator::new(registry),
            actor: config.actor.clone(),
        }
    }

    /// Builds and persists a draft guide
    pub async fn create_guide(
        &self,
        clinic_id: ClinicId,
        payload: GuidePayload,
        version_override: Option<&str>,
    ) -> Result<Guide, SubmissionError> {
        let guide = self.builder.build(clinic_id, payload, version_override)?;
        self.guides.insert(guide.clone()).await?;
        self.record(
            AuditAction::Create,
            "guide",
            &guide.guide_number,
            Some(serde_json::json!({
                "kind": guide.kind.as_str(),
                "total": guide.total.wire_format(),
                "content_hash": guide.content_hash,
            })),
        )
        .await?;
        Ok(guide)
    }

    /// Loads the requested guides and assembles them into a pending batch.
    /// Members are marked submitted; locking happens when delivery is
    /// attempted.
    pub async fn assemble_batch(
        &self,
        clinic_id: ClinicId,
        guide_ids: &[GuideId],
        kind: GuideKind,
        transport_method: TransportMethod,
    ) -> Result<Batch, SubmissionError> {
        let mut guides = self.guides.get_many(guide_ids).await?;
        let batch = BatchAssembler::assemble(clinic_id, &guides, kind, transport_method)?;
        self.batches.insert(batch.clone()).await?;

        for guide in &mut guides {
            guide.mark_submitted()?;
            self.guides.update(guide.clone()).await?;
            self.record(
                AuditAction::Update,
                "guide",
                &guide.guide_number,
                Some(serde_json::json!({
                    "status": "submitted",
                    "batch": batch.batch_number,
                })),
            )
            .await?;
        }

        self.record(
            AuditAction::Create,
            "batch",
            &batch.batch_number,
            Some(serde_json::json!({
                "guides": batch.guide_ids.len(),
                "total": batch.total.wire_format(),
                "content_hash": batch.content_hash,
            })),
        )
        .await?;
        Ok(batch)
    }

    /// Delivers a batch: integrity check, schema validation, transport send,
    /// then submission bookkeeping. Delivery failures are recorded on the
    /// batch and returned as the updated state, not as an `Err`.
    pub async fn submit_batch(
        &self,
        batch_id: BatchId,
        endpoint: &EndpointConfig,
    ) -> Result<Batch, SubmissionError> {
        let batch = self.batches.get(batch_id).await?;
        if !verify_integrity(&batch, &batch.content_hash) {
            return Err(SubmissionError::IntegrityViolation {
                entity: "batch",
                id: batch.batch_number,
            });
        }
        let xml = batch
            .xml
            .clone()
            .ok_or_else(|| SubmissionError::MissingEnvelope(batch.batch_number.clone()))?;

        let report = self.validator.validate(&xml, &batch.tiss_version);
        if report.is_configuration_problem() {
            return Err(SubmissionError::Configuration(format!(
                "no schema registered for version {}",
                batch.tiss_version
            )));
        }
        // Schema defects require a fix, not a retry: the batch stays pending
        // and the violations are surfaced to the caller.
        if !report.is_valid {
            let summary = report
                .errors
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SubmissionError::SchemaInvalid {
                batch_number: batch.batch_number,
                summary,
            });
        }

        let sender = SenderFactory::sender(batch.transport_method);
        self.dispatch(&batch, sender, endpoint, xml).await
    }

    /// Re-attempts delivery of a failed batch, enforcing the retry budget
    pub async fn retry_batch(
        &self,
        batch_id: BatchId,
        endpoint: &EndpointConfig,
    ) -> Result<Batch, SubmissionError> {
        let batch = self.batches.get(batch_id).await?;
        if !batch.should_retry() {
            return Err(SubmissionError::RetriesExhausted(batch.batch_number));
        }
        self.submit_batch(batch_id, endpoint).await
    }

    async fn dispatch(
        &self,
        batch: &Batch,
        sender: Arc<dyn TransportSender>,
        endpoint: &EndpointConfig,
        xml: String,
    ) -> Result<Batch, SubmissionError> {
        let dispatch = BatchDispatch {
            batch_number: batch.batch_number.clone(),
            xml,
        };
        let outcome = sender.send(&dispatch, endpoint).await;

        if outcome.success {
            let updated = self
                .batches
                .update_submission(
                    batch.id,
                    BatchUpdate::RecordSuccess {
                        protocol_number: outcome.tracking_number.clone(),
                    },
                )
                .await?;
            self.lock_members(&updated).await?;
            self.record(
                AuditAction::Submit,
                "batch",
                &updated.batch_number,
                Some(serde_json::json!({
                    "transport": updated.transport_method.as_str(),
                    "protocol_number": outcome.tracking_number,
                })),
            )
            .await?;
            Ok(updated)
        } else {
            let error = outcome
                .error
                .unwrap_or_else(|| "delivery failed".to_string());
            self.record_failed_attempt(batch, error).await
        }
    }

    async fn record_failed_attempt(
        &self,
        batch: &Batch,
        error: String,
    ) -> Result<Batch, SubmissionError> {
        let updated = self
            .batches
            .update_submission(batch.id, BatchUpdate::RecordFailure { error: error.clone() })
            .await?;
        self.record(
            AuditAction::Retry,
            "batch",
            &updated.batch_number,
            Some(serde_json::json!({
                "error": error,
                "retry_count": updated.retry_count,
                "next_retry_at": updated.next_retry_at,
            })),
        )
        .await?;
        Ok(updated)
    }

    /// Locks every member guide of an accepted batch
    async fn lock_members(&self, batch: &Batch) -> Result<(), SubmissionError> {
        let mut guides = self.guides.get_many(&batch.guide_ids).await?;
        for guide in &mut guides {
            guide.lock()?;
            self.guides.update(guide.clone()).await?;
            self.record(
                AuditAction::Lock,
                "guide",
                &guide.guide_number,
                Some(serde_json::json!({"batch": batch.batch_number})),
            )
            .await?;
        }
        Ok(())
    }

    /// Parses an inbound protocol receipt and records the ingestion
    pub async fn ingest_protocol(&self, xml: &str) -> Result<ProtocolReceipt, SubmissionError> {
        let receipt = ProtocolParser::parse(xml)?;
        self.record(
            AuditAction::Parse,
            "protocol",
            receipt.protocol_number.as_deref().unwrap_or("-"),
            Some(serde_json::json!({
                "batch": receipt.batch_number,
                "status": receipt.status,
            })),
        )
        .await?;
        Ok(receipt)
    }

    /// Parses an inbound return statement and interprets its denials
    pub async fn ingest_statement(
        &self,
        xml: &str,
    ) -> Result<(ReturnStatement, Vec<Interpretation>, DenialSummary), SubmissionError> {
        let statement = StatementParser::parse(xml)?;
        let denials: Vec<DenialRecord> = statement.all_denials().cloned().collect();
        let (interpreted, summary) = DenialInterpreter::interpret_many(&denials);

        self.record(
            AuditAction::Parse,
            "statement",
            statement.statement_number.as_deref().unwrap_or("-"),
            Some(serde_json::json!({
                "guides": statement.guides.len(),
                "denials": summary.total,
            })),
        )
        .await?;
        Ok((statement, interpreted, summary))
    }

    /// Parses an inbound payment statement
    pub async fn ingest_payment(&self, xml: &str) -> Result<PaymentStatement, SubmissionError> {
        let payment = PaymentParser::parse(xml)?;
        self.record(
            AuditAction::Parse,
            "payment",
            payment.payment_number.as_deref().unwrap_or("-"),
            Some(serde_json::json!({
                "total_value": payment.total_value,
                "net_value": payment.net_value,
            })),
        )
        .await?;
        Ok(payment)
    }

    /// Audit trail for one entity
    pub async fn audit_trail(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEntry>, SubmissionError> {
        Ok(self.audit.entries_for(entity_type, entity_id).await?)
    }

    async fn record(
        &self,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
        changes: Option<serde_json::Value>,
    ) -> Result<(), SubmissionError> {
        self.audit
            .append(AuditEntry::new(
                self.actor.clone(),
                action,
                entity_type,
                entity_id,
                changes,
            ))
            .await?;
        Ok(())
    }
}
