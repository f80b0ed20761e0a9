//! Guide payload blocks
//!
//! Explicit required-field structs for everything this core validates, hashes,
//! or renders (CNPJ, ANS registration, beneficiary identity, procedure lines).
//! Genuinely payer-variable data rides in the untyped `extra` field and is
//! never validated, hashed, or rendered here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chrono::NaiveDate;
use core_kernel::Money;

use crate::error::GuideError;
use crate::guide::GuideKind;

/// Provider (prestador) identification block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentification {
    /// 14-digit CNPJ, digits only
    pub cnpj: String,
    pub name: String,
    /// Provider code assigned by the operator
    pub operator_assigned_code: Option<String>,
}

/// Operator (operadora) identification block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorIdentification {
    /// 14-digit CNPJ, digits only
    pub cnpj: String,
    pub name: String,
    /// 6-digit ANS regulatory registration
    pub ans_registration: String,
}

/// Beneficiary (beneficiario) identification block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryIdentification {
    /// Insurance card number
    pub card_number: String,
    /// 11-digit CPF, digits only
    pub cpf: Option<String>,
    pub name: String,
}

/// Contracted party (contratado) block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractedParty {
    pub code: Option<String>,
    pub name: String,
    pub cnpj: Option<String>,
}

/// One executed procedure line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureLine {
    /// TUSS procedure code
    pub tuss_code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_value: Money,
}

impl ProcedureLine {
    /// Line total: quantity × unit value
    pub fn total(&self) -> Money {
        self.unit_value.multiply(Decimal::from(self.quantity))
    }
}

/// Kind-specific guide detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindDetail {
    Consultation,
    Sadt {
        requesting_professional: String,
        professional_council: String,
        attendance_character: Option<String>,
    },
    Hospitalization {
        admission_date: NaiveDate,
        discharge_date: Option<NaiveDate>,
        /// Regime code (1 = hospitalar, 2 = hospital-dia, ...)
        regime: String,
    },
    IndividualFee {
        professional_council: String,
        council_number: String,
    },
    PreAuthorization {
        request_date: NaiveDate,
        clinical_indication: String,
    },
}

impl KindDetail {
    /// The guide kind this detail belongs to
    pub fn kind(&self) -> GuideKind {
        match self {
            KindDetail::Consultation => GuideKind::Consultation,
            KindDetail::Sadt { .. } => GuideKind::Sadt,
            KindDetail::Hospitalization { .. } => GuideKind::Hospitalization,
            KindDetail::IndividualFee { .. } => GuideKind::IndividualFee,
            KindDetail::PreAuthorization { .. } => GuideKind::PreAuthorization,
        }
    }
}

/// Caller-supplied structured data for building one guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidePayload {
    pub provider: ProviderIdentification,
    pub operator: OperatorIdentification,
    pub beneficiary: BeneficiaryIdentification,
    pub contracted: ContractedParty,
    pub procedures: Vec<ProcedureLine>,
    /// Declared total; must equal the sum of the procedure line totals
    pub declared_total: Money,
    pub detail: KindDetail,
    /// Payer-specific variable data; opaque to this core
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl GuidePayload {
    /// Sum of the procedure line totals
    pub fn line_total(&self) -> Result<Money, GuideError> {
        Money::sum(
            self.declared_total.currency(),
            self.procedures.iter().map(|p| p.total()).collect::<Vec<_>>().iter(),
        )
        .map_err(|e| GuideError::validation(e.to_string()))
    }
}

/// Validates digit-only identity fields of a fixed width
pub(crate) fn require_digits(
    value: &str,
    width: usize,
    field: &'static str,
) -> Result<(), GuideError> {
    if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GuideError::validation(format!(
            "{field} must be exactly {width} digits, got {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_procedure_line_total() {
        let line = ProcedureLine {
            tuss_code: "10101012".to_string(),
            description: "Consulta em consultório".to_string(),
            quantity: 3,
            unit_value: Money::brl(dec!(50.00)),
        };
        assert_eq!(line.total(), Money::brl(dec!(150.00)));
    }

    #[test]
    fn test_detail_kind_mapping() {
        assert_eq!(KindDetail::Consultation.kind(), GuideKind::Consultation);
        let hosp = KindDetail::Hospitalization {
            admission_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            discharge_date: None,
            regime: "1".to_string(),
        };
        assert_eq!(hosp.kind(), GuideKind::Hospitalization);
    }

    #[test]
    fn test_require_digits() {
        assert!(require_digits("12345678000190", 14, "cnpj").is_ok());
        assert!(require_digits("123", 14, "cnpj").is_err());
        assert!(require_digits("1234567800019X", 14, "cnpj").is_err());
    }
}
