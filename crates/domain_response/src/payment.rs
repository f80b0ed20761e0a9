//! Payment statement parser

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wire_format::Element;

use crate::error::ParseError;

/// Bank details attached to a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub bank_code: Option<String>,
    pub bank_name: Option<String>,
    pub agency: Option<String>,
    pub account: Option<String>,
}

impl BankAccount {
    fn is_empty(&self) -> bool {
        self.bank_code.is_none()
            && self.bank_name.is_none()
            && self.agency.is_none()
            && self.account.is_none()
    }
}

/// A statement settled by this payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledStatement {
    pub statement_number: Option<String>,
    pub statement_date: Option<String>,
    pub value: Option<String>,
}

/// A parsed payment statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatement {
    pub payment_number: Option<String>,
    pub payment_date: Option<String>,
    pub due_date: Option<String>,
    pub operator_cnpj: Option<String>,
    pub operator_name: Option<String>,
    pub provider_cnpj: Option<String>,
    pub provider_name: Option<String>,
    pub total_value: Option<String>,
    pub net_value: Option<String>,
    pub discounts: Option<String>,
    pub payment_method: Option<String>,
    pub bank: Option<BankAccount>,
    pub statements: Vec<SettledStatement>,
    pub parsed_at: DateTime<Utc>,
}

impl PaymentStatement {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.payment_number.is_none() {
            problems.push("payment number is required".to_string());
        }
        if self.payment_date.is_none() {
            problems.push("payment date is required".to_string());
        }
        if self.operator_cnpj.is_none() {
            problems.push("operator CNPJ is required".to_string());
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

pub struct PaymentParser;

impl PaymentParser {
    pub fn parse(xml: &str) -> Result<PaymentStatement, ParseError> {
        let root = Element::parse(xml)?;

        let bank = BankAccount {
            bank_code: root.first_text(&["codigoBanco"]),
            bank_name: root.first_text(&["nomeBanco"]),
            agency: root.first_text(&["agencia"]),
            account: root.first_text(&["conta"]),
        };

        let statements = root
            .find_all("demonstrativo")
            .into_iter()
            .map(|stmt| SettledStatement {
                statement_number: stmt.first_text(&["numeroDemonstrativo"]),
                statement_date: stmt.first_text(&["dataDemonstrativo"]),
                value: stmt.first_text(&["valor"]),
            })
            .collect();

        let payment = PaymentStatement {
            payment_number: root.first_text(&["numeroPagamento", "numeroDemonstrativoPagamento"]),
            payment_date: root.first_text(&["dataPagamento", "dataLiquidacao"]),
            due_date: root.first_text(&["dataVencimento"]),
            operator_cnpj: root.first_text(&["cnpjOperadora"]),
            operator_name: root.first_text(&["nomeOperadora"]),
            provider_cnpj: root.first_text(&["cnpjPrestador"]),
            provider_name: root.first_text(&["nomePrestador"]),
            total_value: root.first_text(&["valorTotal", "valorTotalPago"]),
            net_value: root.first_text(&["valorLiquido", "valorLiquidoPagamento"]),
            discounts: root.first_text(&["valorDescontos", "totalDescontos"]),
            payment_method: root.first_text(&["formaPagamento", "metodoPagamento"]),
            bank: if bank.is_empty() { None } else { Some(bank) },
            statements,
            parsed_at: Utc::now(),
        };

        tracing::info!(
            payment = payment.payment_number.as_deref().unwrap_or("-"),
            "parsed payment statement"
        );
        Ok(payment)
    }
}
