//! Test Data Builders
//!
//! Builders with sensible defaults so tests only specify the fields they
//! exercise.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::Money;
use domain_guides::{GuidePayload, KindDetail, ProcedureLine};

use crate::fixtures::IdentityFixtures;

/// Builder for guide payloads
pub struct GuidePayloadBuilder {
    procedures: Vec<ProcedureLine>,
    detail: KindDetail,
    declared_total: Option<Money>,
}

impl Default for GuidePayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GuidePayloadBuilder {
    /// A consultation payload with one 150.00 BRL procedure line
    pub fn new() -> Self {
        Self {
            procedures: vec![ProcedureLine {
                tuss_code: "10101012".to_string(),
                description: "Consulta em consultório".to_string(),
                quantity: 1,
                unit_value: Money::brl(dec!(150.00)),
            }],
            detail: KindDetail::Consultation,
            declared_total: None,
        }
    }

    /// Replaces the procedure lines
    pub fn with_procedures(mut self, procedures: Vec<ProcedureLine>) -> Self {
        self.procedures = procedures;
        self
    }

    /// Adds one procedure line
    pub fn with_procedure(mut self, tuss_code: &str, quantity: u32, unit_value: Decimal) -> Self {
        self.procedures.push(ProcedureLine {
            tuss_code: tuss_code.to_string(),
            description: format!("Procedimento {tuss_code}"),
            quantity,
            unit_value: Money::brl(unit_value),
        });
        self
    }

    /// Sets the kind-specific detail block
    pub fn with_detail(mut self, detail: KindDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Overrides the declared total (defaults to the line sum)
    pub fn with_declared_total(mut self, total: Money) -> Self {
        self.declared_total = Some(total);
        self
    }

    /// SADT detail with a default requesting professional
    pub fn sadt(self) -> Self {
        self.with_detail(KindDetail::Sadt {
            requesting_professional: "Dra. Ana Souza".to_string(),
            professional_council: "CRM".to_string(),
            attendance_character: Some("1".to_string()),
        })
    }

    /// Hospitalization detail with a ten-day stay
    pub fn hospitalization(self) -> Self {
        self.with_detail(KindDetail::Hospitalization {
            admission_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default(),
            discharge_date: NaiveDate::from_ymd_opt(2025, 2, 10),
            regime: "1".to_string(),
        })
    }

    pub fn build(self) -> GuidePayload {
        let declared_total = self.declared_total.unwrap_or_else(|| {
            let mut sum = Money::brl(Decimal::ZERO);
            for line in &self.procedures {
                sum = sum + line.total();
            }
            sum
        });
        GuidePayload {
            provider: IdentityFixtures::provider(),
            operator: IdentityFixtures::operator(),
            beneficiary: IdentityFixtures::beneficiary(),
            contracted: IdentityFixtures::contracted(),
            procedures: self.procedures,
            declared_total,
            detail: self.detail,
            extra: None,
        }
    }
}
