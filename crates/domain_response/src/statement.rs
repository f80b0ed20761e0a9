//! Return statement parser
//!
//! Statements report the per-guide outcome of a processed batch, including
//! denial (glosa) records. Monetary values stay as wire text; interpretation
//! happens downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wire_format::Element;

use crate::error::ParseError;

/// One denial record attached to a guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialRecord {
    pub code: Option<String>,
    pub description: Option<String>,
    pub value: Option<String>,
}

/// One guide's outcome inside a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementGuide {
    pub guide_number: Option<String>,
    pub guide_kind: Option<String>,
    pub status: Option<String>,
    pub value: Option<String>,
    pub denials: Vec<DenialRecord>,
}

/// A parsed return statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub statement_number: Option<String>,
    pub statement_date: Option<String>,
    pub operator_cnpj: Option<String>,
    pub operator_name: Option<String>,
    pub provider_cnpj: Option<String>,
    pub provider_name: Option<String>,
    pub total_value: Option<String>,
    pub approved_value: Option<String>,
    pub rejected_value: Option<String>,
    pub guides: Vec<StatementGuide>,
    pub parsed_at: DateTime<Utc>,
}

impl ReturnStatement {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.statement_number.is_none() {
            problems.push("statement number is required".to_string());
        }
        if self.statement_date.is_none() {
            problems.push("statement date is required".to_string());
        }
        if self.operator_cnpj.is_none() {
            problems.push("operator CNPJ is required".to_string());
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// All denial records across the statement's guides
    pub fn all_denials(&self) -> impl Iterator<Item = &DenialRecord> {
        self.guides.iter().flat_map(|g| g.denials.iter())
    }
}

pub struct StatementParser;

impl StatementParser {
    pub fn parse(xml: &str) -> Result<ReturnStatement, ParseError> {
        let root = Element::parse(xml)?;

        let guides = root
            .find_all("guia")
            .into_iter()
            .map(|guide| StatementGuide {
                guide_number: guide.first_text(&["numeroGuia"]),
                guide_kind: guide.first_text(&["tipoGuia"]),
                status: guide.first_text(&["situacao"]),
                value: guide.first_text(&["valor"]),
                denials: guide
                    .find_all("motivoGlosa")
                    .into_iter()
                    .map(|denial| DenialRecord {
                        code: denial.first_text(&["codigoGlosa"]),
                        description: denial.first_text(&["descricaoGlosa"]),
                        value: denial.first_text(&["valorGlosa"]),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        let statement = ReturnStatement {
            statement_number: root
                .first_text(&["numeroDemonstrativo", "numeroDemonstrativoRetorno"]),
            statement_date: root.first_text(&["dataDemonstrativo", "dataEmissao"]),
            operator_cnpj: root.first_text(&["cnpjOperadora"]),
            operator_name: root.first_text(&["nomeOperadora"]),
            provider_cnpj: root.first_text(&["cnpjPrestador"]),
            provider_name: root.first_text(&["nomePrestador"]),
            total_value: root.first_text(&["valorTotal", "valorTotalDemonstrativo"]),
            approved_value: root.first_text(&["valorAprovado", "valorTotalAprovado"]),
            rejected_value: root.first_text(&["valorRejeitado", "valorTotalRejeitado"]),
            guides,
            parsed_at: Utc::now(),
        };

        tracing::info!(
            statement = statement.statement_number.as_deref().unwrap_or("-"),
            guides = statement.guides.len(),
            "parsed return statement"
        );
        Ok(statement)
    }
}
