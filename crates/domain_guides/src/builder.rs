//! Guide builder
//!
//! Builds a draft guide from caller-supplied structured data: validates the
//! identity blocks and kind-specific rules, checks the declared total against
//! the line items, generates the guide number, renders the XML body, and
//! computes the integrity hash.
//!
//! Missing identity data is a validation error. No placeholder identity values
//! are ever substituted; silently changing submitted identity data is not
//! acceptable in a regulated path.

use std::sync::Arc;

use chrono::Utc;
use core_kernel::{integrity_hash, ClinicId, GuideId};
use wire_format::VersionRegistry;

use crate::error::GuideError;
use crate::guide::{Guide, GuideKind, GuideStatus};
use crate::payload::{require_digits, GuidePayload, KindDetail};
use crate::render;

/// Builds draft guides of any kind
pub struct GuideBuilder {
    registry: Arc<VersionRegistry>,
}

impl GuideBuilder {
    pub fn new(registry: Arc<VersionRegistry>) -> Self {
        Self { registry }
    }

    /// Builds a draft guide from a payload.
    ///
    /// The guide kind is carried by the payload's detail variant. An explicit
    /// `version_override` must name a registered version; otherwise the
    /// registry's current default applies.
    pub fn build(
        &self,
        clinic_id: ClinicId,
        payload: GuidePayload,
        version_override: Option<&str>,
    ) -> Result<Guide, GuideError> {
        let kind = payload.detail.kind();

        validate_identity_blocks(&payload)?;
        rules::validate(kind, &payload)?;
        validate_totals(&payload)?;

        let version = match version_override {
            Some(version) if self.registry.is_supported(version) => version.to_string(),
            Some(version) => {
                return Err(GuideError::validation(format!(
                    "unsupported TISS version: {version}"
                )));
            }
            None => self.registry.current_version().to_string(),
        };

        let now = Utc::now();
        let guide_number = generate_guide_number(clinic_id, kind);
        let total = payload.declared_total;

        let mut guide = Guide {
            id: GuideId::new_v7(),
            guide_number,
            clinic_id,
            kind,
            payload,
            total,
            tiss_version: version,
            content_hash: String::new(),
            xml: None,
            status: GuideStatus::Draft,
            locked: false,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        };

        guide.xml = Some(render::render_guide_body(&guide)?);
        guide.content_hash = integrity_hash(&guide);

        tracing::info!(
            guide = %guide.guide_number,
            kind = %guide.kind,
            total = %guide.total,
            "built draft guide"
        );
        Ok(guide)
    }
}

fn validate_identity_blocks(payload: &GuidePayload) -> Result<(), GuideError> {
    let provider = &payload.provider;
    if provider.name.trim().is_empty() {
        return Err(GuideError::MissingBlock("provider name"));
    }
    require_digits(&provider.cnpj, 14, "provider CNPJ")?;

    let operator = &payload.operator;
    if operator.name.trim().is_empty() {
        return Err(GuideError::MissingBlock("operator name"));
    }
    require_digits(&operator.cnpj, 14, "operator CNPJ")?;
    require_digits(&operator.ans_registration, 6, "ANS registration")?;

    let beneficiary = &payload.beneficiary;
    if beneficiary.card_number.trim().is_empty() {
        return Err(GuideError::MissingBlock("beneficiary card number"));
    }
    if beneficiary.name.trim().is_empty() {
        return Err(GuideError::MissingBlock("beneficiary name"));
    }
    if let Some(cpf) = &beneficiary.cpf {
        require_digits(cpf, 11, "beneficiary CPF")?;
    }

    if payload.contracted.name.trim().is_empty() {
        return Err(GuideError::MissingBlock("contracted party name"));
    }

    Ok(())
}

fn validate_totals(payload: &GuidePayload) -> Result<(), GuideError> {
    if payload.procedures.is_empty() {
        return Err(GuideError::validation(
            "guide requires at least one procedure line",
        ));
    }
    for line in &payload.procedures {
        if line.tuss_code.trim().is_empty() {
            return Err(GuideError::validation("procedure line missing TUSS code"));
        }
        if line.quantity == 0 {
            return Err(GuideError::validation("procedure quantity must be positive"));
        }
        if !line.unit_value.is_positive() {
            return Err(GuideError::validation(
                "procedure unit value must be positive",
            ));
        }
    }
    if !payload.declared_total.is_positive() {
        return Err(GuideError::validation("declared total must be positive"));
    }

    let computed = payload.line_total()?;
    if computed != payload.declared_total {
        return Err(GuideError::TotalMismatch {
            declared: payload.declared_total.wire_format(),
            computed: computed.wire_format(),
        });
    }
    Ok(())
}

/// Generates a clinic-scoped, practically unique guide number:
/// `G{clinic prefix}{timestamp}`
fn generate_guide_number(clinic_id: ClinicId, kind: GuideKind) -> String {
    let prefix: String = clinic_id
        .as_uuid()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    let kind_digit = match kind {
        GuideKind::Consultation => "1",
        GuideKind::Sadt => "2",
        GuideKind::Hospitalization => "3",
        GuideKind::IndividualFee => "4",
        GuideKind::PreAuthorization => "5",
    };
    format!(
        "G{kind_digit}{prefix}{}",
        Utc::now().format("%Y%m%d%H%M%S%3f")
    )
}

/// Per-kind validation rules, keyed by guide kind
mod rules {
    use super::*;

    pub fn validate(kind: GuideKind, payload: &GuidePayload) -> Result<(), GuideError> {
        if payload.detail.kind() != kind {
            return Err(GuideError::DetailKindMismatch {
                kind: kind.to_string(),
            });
        }
        match &payload.detail {
            KindDetail::Consultation => Ok(()),
            KindDetail::Sadt {
                requesting_professional,
                professional_council,
                ..
            } => {
                if requesting_professional.trim().is_empty() {
                    return Err(GuideError::MissingBlock("SADT requesting professional"));
                }
                if professional_council.trim().is_empty() {
                    return Err(GuideError::MissingBlock("SADT professional council"));
                }
                Ok(())
            }
            KindDetail::Hospitalization {
                admission_date,
                discharge_date,
                regime,
            } => {
                if regime.trim().is_empty() {
                    return Err(GuideError::MissingBlock("hospitalization regime"));
                }
                if let Some(discharge) = discharge_date {
                    if discharge < admission_date {
                        return Err(GuideError::validation(
                            "discharge date precedes admission date",
                        ));
                    }
                }
                Ok(())
            }
            KindDetail::IndividualFee {
                professional_council,
                council_number,
            } => {
                if professional_council.trim().is_empty() || council_number.trim().is_empty() {
                    return Err(GuideError::MissingBlock(
                        "individual fee professional council",
                    ));
                }
                Ok(())
            }
            KindDetail::PreAuthorization {
                clinical_indication,
                ..
            } => {
                if clinical_indication.trim().is_empty() {
                    return Err(GuideError::MissingBlock(
                        "pre-authorization clinical indication",
                    ));
                }
                Ok(())
            }
        }
    }
}
