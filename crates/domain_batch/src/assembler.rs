//! Batch assembly
//!
//! Pure assembly over already-loaded guides: membership checks, lot-level
//! limits, total computation, envelope rendering, and integrity hashing.
//! Loading guides and persisting the result belong to the caller.

use chrono::Utc;
use core_kernel::{integrity_hash, verify_integrity, BatchId, ClinicId, Money};
use domain_guides::{Guide, GuideKind};
use infra_transport::TransportMethod;
use wire_format::EnvelopeHeader;

use crate::batch::{Batch, SubmissionStatus};
use crate::error::BatchError;
use crate::retry::DEFAULT_MAX_RETRIES;

/// Regulated per-lot ceiling
pub const MAX_GUIDES_PER_BATCH: usize = 1000;

/// Assembles submission batches from draft guides
pub struct BatchAssembler;

impl BatchAssembler {
    /// Assembles one batch from the given guides.
    ///
    /// Every guide must belong to `clinic_id`, match `kind`, be unlocked, and
    /// carry a rendered body targeting the same version. Each guide's declared
    /// total is re-checked against its line items and its integrity hash
    /// before it may join; the batch total is computed here from the member
    /// guides, never declared by the caller.
    pub fn assemble(
        clinic_id: ClinicId,
        guides: &[Guide],
        kind: GuideKind,
        transport_method: TransportMethod,
    ) -> Result<Batch, BatchError> {
        if guides.is_empty() {
            return Err(BatchError::Empty);
        }
        if guides.len() > MAX_GUIDES_PER_BATCH {
            return Err(BatchError::LimitExceeded {
                count: guides.len(),
                max: MAX_GUIDES_PER_BATCH,
            });
        }

        let version = guides[0].tiss_version.clone();
        let mut bodies = Vec::with_capacity(guides.len());
        for guide in guides {
            if guide.clinic_id != clinic_id {
                return Err(BatchError::WrongClinic {
                    guide_number: guide.guide_number.clone(),
                });
            }
            if guide.kind != kind {
                return Err(BatchError::KindMismatch {
                    guide_number: guide.guide_number.clone(),
                    expected: kind.to_string(),
                    found: guide.kind.to_string(),
                });
            }
            if guide.locked {
                return Err(BatchError::GuideLocked(guide.guide_number.clone()));
            }
            if guide.tiss_version != version {
                return Err(BatchError::VersionMismatch {
                    guide_number: guide.guide_number.clone(),
                    expected: version.clone(),
                    found: guide.tiss_version.clone(),
                });
            }
            let body = guide
                .xml
                .as_deref()
                .ok_or_else(|| BatchError::MissingBody(guide.guide_number.clone()))?;

            // Drafts are mutable until locked, so the build-time checks do
            // not hold here: re-verify the declared total and the content
            // hash before the guide's value flows into the batch total.
            let line_total = guide
                .line_total()
                .map_err(|e| BatchError::validation(e.to_string()))?;
            if line_total != guide.total {
                return Err(BatchError::TotalMismatch {
                    guide_number: guide.guide_number.clone(),
                    declared: guide.total.wire_format(),
                    computed: line_total.wire_format(),
                });
            }
            if !verify_integrity(guide, &guide.content_hash) {
                return Err(BatchError::TamperedGuide(guide.guide_number.clone()));
            }
            bodies.push(body.to_string());
        }

        let totals: Vec<Money> = guides.iter().map(|g| g.total).collect();
        let total = Money::sum(guides[0].total.currency(), totals.iter())
            .map_err(|e| BatchError::validation(e.to_string()))?;

        let now = Utc::now();
        let batch_number = generate_batch_number(clinic_id);

        let first = &guides[0].payload;
        let header = EnvelopeHeader::guide_batch(
            version.clone(),
            now,
            first.provider.cnpj.clone(),
            first.operator.ans_registration.clone(),
        );
        let xml = wire_format::render_envelope(&header, &batch_number, &bodies)?;

        let mut batch = Batch {
            id: BatchId::new_v7(),
            clinic_id,
            batch_number,
            kind,
            guide_ids: guides.iter().map(|g| g.id).collect(),
            total,
            tiss_version: version,
            xml: Some(xml),
            content_hash: String::new(),
            status: SubmissionStatus::Pending,
            transport_method,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            last_retry_at: None,
            next_retry_at: None,
            protocol_number: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            sent_at: None,
        };
        batch.content_hash = integrity_hash(&batch);

        tracing::info!(
            batch = %batch.batch_number,
            guides = batch.guide_ids.len(),
            total = %batch.total,
            "assembled batch"
        );
        Ok(batch)
    }
}

/// `LOTE{clinic prefix}{timestamp}`, unique per clinic in practice
fn generate_batch_number(clinic_id: ClinicId) -> String {
    let prefix: String = clinic_id
        .as_uuid()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("LOTE{prefix}{}", Utc::now().format("%Y%m%d%H%M%S"))
}
