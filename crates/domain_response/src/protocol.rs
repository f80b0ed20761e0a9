//! Protocol receipt parser
//!
//! Operators acknowledge batch receipt with a protocol document. Element
//! names vary between operators, so every field is looked up under a list of
//! known spellings and kept as wire text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wire_format::Element;

use crate::error::ParseError;

/// One validation error reported inside a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptError {
    pub code: Option<String>,
    pub message: Option<String>,
    pub severity: String,
}

/// A parsed protocol receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolReceipt {
    pub protocol_number: Option<String>,
    pub protocol_date: Option<String>,
    pub protocol_time: Option<String>,
    pub batch_number: Option<String>,
    pub operator_cnpj: Option<String>,
    pub operator_name: Option<String>,
    pub status: Option<String>,
    pub errors: Vec<ReceiptError>,
    pub parsed_at: DateTime<Utc>,
}

impl ProtocolReceipt {
    /// Fields a usable receipt must carry
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.protocol_number.is_none() {
            problems.push("protocol number is required".to_string());
        }
        if self.protocol_date.is_none() {
            problems.push("protocol date is required".to_string());
        }
        if self.batch_number.is_none() {
            problems.push("batch number is required".to_string());
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

pub struct ProtocolParser;

impl ProtocolParser {
    pub fn parse(xml: &str) -> Result<ProtocolReceipt, ParseError> {
        let root = Element::parse(xml)?;

        let errors = root
            .find_all("erro")
            .into_iter()
            .map(|e| ReceiptError {
                code: e.first_text(&["codigo"]),
                message: e.first_text(&["mensagem"]),
                severity: e
                    .first_text(&["severidade"])
                    .unwrap_or_else(|| "ERROR".to_string()),
            })
            .collect();

        let receipt = ProtocolReceipt {
            protocol_number: root.first_text(&["numeroProtocolo", "numeroProtocoloRecebimento"]),
            protocol_date: root.first_text(&["dataProtocolo", "dataRecebimento"]),
            protocol_time: root.first_text(&["horaProtocolo", "horaRecebimento"]),
            batch_number: root.first_text(&["numeroLote", "numeroLoteGuia"]),
            operator_cnpj: root.first_text(&["cnpjOperadora"]),
            operator_name: root.first_text(&["nomeOperadora"]),
            status: root.first_text(&["situacao", "status"]),
            errors,
            parsed_at: Utc::now(),
        };

        tracing::info!(
            protocol = receipt.protocol_number.as_deref().unwrap_or("-"),
            batch = receipt.batch_number.as_deref().unwrap_or("-"),
            "parsed protocol receipt"
        );
        Ok(receipt)
    }
}
