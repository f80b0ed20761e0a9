//! Guide aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use core_kernel::{Canonical, ClinicId, GuideId, Money};

use crate::error::GuideError;
use crate::payload::GuidePayload;

/// The five regulated guide kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideKind {
    Consultation,
    Sadt,
    Hospitalization,
    IndividualFee,
    PreAuthorization,
}

impl GuideKind {
    /// Stable identifier used in storage and audit records
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideKind::Consultation => "consultation",
            GuideKind::Sadt => "sadt",
            GuideKind::Hospitalization => "hospitalization",
            GuideKind::IndividualFee => "individual_fee",
            GuideKind::PreAuthorization => "pre_authorization",
        }
    }

    /// The XML element name of this kind's guide body
    pub fn xml_element(&self) -> &'static str {
        match self {
            GuideKind::Consultation => "ans:guiaConsulta",
            GuideKind::Sadt => "ans:guiaSP-SADT",
            GuideKind::Hospitalization => "ans:guiaResumoInternacao",
            GuideKind::IndividualFee => "ans:guiaHonorarioIndividual",
            GuideKind::PreAuthorization => "ans:guiaSolicitacaoAutorizacao",
        }
    }
}

impl fmt::Display for GuideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Guide lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideStatus {
    /// Built and persisted, still editable
    Draft,
    /// Sent as part of a batch
    Submitted,
    /// Immutable; no further writes accepted
    Locked,
}

/// A single billing claim document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guide {
    /// Unique identifier
    pub id: GuideId,
    /// Human-readable guide number, unique per clinic
    pub guide_number: String,
    /// Owning clinic
    pub clinic_id: ClinicId,
    /// Guide kind
    pub kind: GuideKind,
    /// Structured payload
    pub payload: GuidePayload,
    /// Declared total value
    pub total: Money,
    /// Wire-format version the guide targets
    pub tiss_version: String,
    /// Integrity hash over the canonical business fields
    pub content_hash: String,
    /// Rendered XML body, None until generated
    pub xml: Option<String>,
    /// Lifecycle status
    pub status: GuideStatus,
    /// One-way latch; guards every write path
    pub locked: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
    /// Stamped when the guide is locked for submission
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Guide {
    /// Locks the guide: Draft/Submitted → Locked, stamping the submission time.
    ///
    /// A second invocation fails and does not re-stamp the timestamp.
    pub fn lock(&mut self) -> Result<(), GuideError> {
        if self.locked {
            return Err(GuideError::AlreadyLocked(self.guide_number.clone()));
        }
        self.locked = true;
        self.status = GuideStatus::Locked;
        self.submitted_at = Some(Utc::now());
        self.updated_at = Utc::now();
        tracing::info!(guide = %self.guide_number, "guide locked");
        Ok(())
    }

    /// Marks the guide as submitted (still unlocked; locking happens when the
    /// batch send attempt is recorded)
    pub fn mark_submitted(&mut self) -> Result<(), GuideError> {
        self.guard_unlocked()?;
        self.status = GuideStatus::Submitted;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Stores the rendered XML body
    pub fn set_xml(&mut self, xml: String) -> Result<(), GuideError> {
        self.guard_unlocked()?;
        self.xml = Some(xml);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Rejects writes when the lock latch is set
    pub fn guard_unlocked(&self) -> Result<(), GuideError> {
        if self.locked {
            return Err(GuideError::AlreadyLocked(self.guide_number.clone()));
        }
        Ok(())
    }

    /// Sum of the guide's procedure line totals
    pub fn line_total(&self) -> Result<Money, GuideError> {
        self.payload.line_total()
    }
}

impl Canonical for Guide {
    fn entity_kind(&self) -> &'static str {
        "guide"
    }

    /// Business fields covered by the integrity hash. The rendered XML and
    /// any free-text extras are deliberately excluded so re-rendering never
    /// invalidates a hash.
    fn canonical_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("guide_number".into(), self.guide_number.clone());
        fields.insert("kind".into(), self.kind.as_str().into());
        fields.insert("tiss_version".into(), self.tiss_version.clone());
        fields.insert("provider_cnpj".into(), self.payload.provider.cnpj.clone());
        fields.insert("operator_cnpj".into(), self.payload.operator.cnpj.clone());
        fields.insert(
            "operator_ans".into(),
            self.payload.operator.ans_registration.clone(),
        );
        fields.insert(
            "beneficiary_card".into(),
            self.payload.beneficiary.card_number.clone(),
        );
        fields.insert("total".into(), self.total.wire_format());
        for (i, line) in self.payload.procedures.iter().enumerate() {
            fields.insert(format!("procedure.{i}.code"), line.tuss_code.clone());
            fields.insert(
                format!("procedure.{i}.quantity"),
                line.quantity.to_string(),
            );
            fields.insert(
                format!("procedure.{i}.unit_value"),
                line.unit_value.wire_format(),
            );
        }
        fields
    }
}
