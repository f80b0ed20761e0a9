//! Comprehensive tests for domain_response

use domain_response::{
    DenialAction, DenialCategory, DenialInterpreter, DenialRecord, ParseError, PaymentParser,
    ProtocolParser, Severity, StatementParser,
};

const PROTOCOL_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ans:mensagemTISS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
    <ans:protocoloRecebimento>
        <ans:numeroProtocolo>PROT20250314001</ans:numeroProtocolo>
        <ans:dataProtocolo>2025-03-14</ans:dataProtocolo>
        <ans:horaProtocolo>09:30:00</ans:horaProtocolo>
        <ans:numeroLote>LOTE42</ans:numeroLote>
        <ans:cnpjOperadora>98765432000109</ans:cnpjOperadora>
        <ans:situacao>RECEBIDO</ans:situacao>
        <ans:erro>
            <ans:codigo>003</ans:codigo>
            <ans:mensagem>Campo obrigatório ausente</ans:mensagem>
        </ans:erro>
    </ans:protocoloRecebimento>
</ans:mensagemTISS>"#;

const STATEMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ans:mensagemTISS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
    <ans:demonstrativoRetorno>
        <ans:numeroDemonstrativo>DEM001</ans:numeroDemonstrativo>
        <ans:dataEmissao>2025-03-20</ans:dataEmissao>
        <ans:cnpjOperadora>98765432000109</ans:cnpjOperadora>
        <ans:cnpjPrestador>12345678000190</ans:cnpjPrestador>
        <ans:valorTotal>350.00</ans:valorTotal>
        <ans:valorAprovado>200.00</ans:valorAprovado>
        <ans:valorRejeitado>150.00</ans:valorRejeitado>
        <ans:guia>
            <ans:numeroGuia>G1001</ans:numeroGuia>
            <ans:situacao>APROVADA</ans:situacao>
            <ans:valor>200.00</ans:valor>
        </ans:guia>
        <ans:guia>
            <ans:numeroGuia>G1002</ans:numeroGuia>
            <ans:situacao>GLOSADA</ans:situacao>
            <ans:valor>150.00</ans:valor>
            <ans:motivoGlosa>
                <ans:codigoGlosa>001</ans:codigoGlosa>
                <ans:descricaoGlosa>Formato XML inválido</ans:descricaoGlosa>
                <ans:valorGlosa>150.00</ans:valorGlosa>
            </ans:motivoGlosa>
        </ans:guia>
    </ans:demonstrativoRetorno>
</ans:mensagemTISS>"#;

const PAYMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ans:mensagemTISS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
    <ans:demonstrativoPagamento>
        <ans:numeroPagamento>PAG777</ans:numeroPagamento>
        <ans:dataPagamento>2025-04-01</ans:dataPagamento>
        <ans:cnpjOperadora>98765432000109</ans:cnpjOperadora>
        <ans:valorTotal>200.00</ans:valorTotal>
        <ans:valorLiquido>190.00</ans:valorLiquido>
        <ans:valorDescontos>10.00</ans:valorDescontos>
        <ans:formaPagamento>credito_em_conta</ans:formaPagamento>
        <ans:codigoBanco>341</ans:codigoBanco>
        <ans:agencia>0001</ans:agencia>
        <ans:conta>12345-6</ans:conta>
        <ans:demonstrativo>
            <ans:numeroDemonstrativo>DEM001</ans:numeroDemonstrativo>
            <ans:valor>200.00</ans:valor>
        </ans:demonstrativo>
    </ans:demonstrativoPagamento>
</ans:mensagemTISS>"#;

// ============================================================================
// Protocol Parser Tests
// ============================================================================

mod protocol_tests {
    use super::*;

    #[test]
    fn test_parse_protocol_receipt() {
        let receipt = ProtocolParser::parse(PROTOCOL_XML).unwrap();

        assert_eq!(receipt.protocol_number.as_deref(), Some("PROT20250314001"));
        assert_eq!(receipt.protocol_date.as_deref(), Some("2025-03-14"));
        assert_eq!(receipt.protocol_time.as_deref(), Some("09:30:00"));
        assert_eq!(receipt.batch_number.as_deref(), Some("LOTE42"));
        assert_eq!(receipt.operator_cnpj.as_deref(), Some("98765432000109"));
        assert_eq!(receipt.status.as_deref(), Some("RECEBIDO"));
        assert!(receipt.is_valid());

        assert_eq!(receipt.errors.len(), 1);
        assert_eq!(receipt.errors[0].code.as_deref(), Some("003"));
        assert_eq!(receipt.errors[0].severity, "ERROR");
    }

    #[test]
    fn test_alternate_element_names() {
        let xml = r#"<recibo>
            <numeroProtocoloRecebimento>P2</numeroProtocoloRecebimento>
            <dataRecebimento>2025-03-15</dataRecebimento>
            <numeroLoteGuia>LOTE43</numeroLoteGuia>
        </recibo>"#;
        let receipt = ProtocolParser::parse(xml).unwrap();
        assert_eq!(receipt.protocol_number.as_deref(), Some("P2"));
        assert_eq!(receipt.protocol_date.as_deref(), Some("2025-03-15"));
        assert_eq!(receipt.batch_number.as_deref(), Some("LOTE43"));
    }

    #[test]
    fn test_missing_fields_are_reported_not_fatal() {
        let receipt = ProtocolParser::parse("<recibo><situacao>OK</situacao></recibo>").unwrap();
        assert!(!receipt.is_valid());
        assert_eq!(receipt.validate().len(), 3);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = ProtocolParser::parse("<recibo><numeroProtocolo>P1</recibo>");
        assert!(matches!(result, Err(ParseError::Malformed { .. })));
    }
}

// ============================================================================
// Statement Parser Tests
// ============================================================================

mod statement_tests {
    use super::*;

    #[test]
    fn test_parse_return_statement() {
        let statement = StatementParser::parse(STATEMENT_XML).unwrap();

        assert_eq!(statement.statement_number.as_deref(), Some("DEM001"));
        assert_eq!(statement.statement_date.as_deref(), Some("2025-03-20"));
        assert_eq!(statement.total_value.as_deref(), Some("350.00"));
        assert_eq!(statement.approved_value.as_deref(), Some("200.00"));
        assert_eq!(statement.rejected_value.as_deref(), Some("150.00"));
        assert!(statement.is_valid());

        assert_eq!(statement.guides.len(), 2);
        let denied = &statement.guides[1];
        assert_eq!(denied.guide_number.as_deref(), Some("G1002"));
        assert_eq!(denied.status.as_deref(), Some("GLOSADA"));
        assert_eq!(denied.denials.len(), 1);
        assert_eq!(denied.denials[0].code.as_deref(), Some("001"));
        assert_eq!(denied.denials[0].value.as_deref(), Some("150.00"));
    }

    #[test]
    fn test_all_denials_spans_guides() {
        let statement = StatementParser::parse(STATEMENT_XML).unwrap();
        assert_eq!(statement.all_denials().count(), 1);
    }
}

// ============================================================================
// Payment Parser Tests
// ============================================================================

mod payment_tests {
    use super::*;

    #[test]
    fn test_parse_payment_statement() {
        let payment = PaymentParser::parse(PAYMENT_XML).unwrap();

        assert_eq!(payment.payment_number.as_deref(), Some("PAG777"));
        assert_eq!(payment.payment_date.as_deref(), Some("2025-04-01"));
        assert_eq!(payment.total_value.as_deref(), Some("200.00"));
        assert_eq!(payment.net_value.as_deref(), Some("190.00"));
        assert_eq!(payment.discounts.as_deref(), Some("10.00"));
        assert_eq!(payment.payment_method.as_deref(), Some("credito_em_conta"));
        assert!(payment.is_valid());

        let bank = payment.bank.as_ref().expect("bank details present");
        assert_eq!(bank.bank_code.as_deref(), Some("341"));
        assert_eq!(bank.account.as_deref(), Some("12345-6"));

        assert_eq!(payment.statements.len(), 1);
        assert_eq!(
            payment.statements[0].statement_number.as_deref(),
            Some("DEM001")
        );
    }

    #[test]
    fn test_bank_block_absent_when_empty() {
        let payment = PaymentParser::parse(
            "<pagamento><numeroPagamento>P1</numeroPagamento></pagamento>",
        )
        .unwrap();
        assert!(payment.bank.is_none());
    }
}

// ============================================================================
// Denial Interpreter Tests
// ============================================================================

mod denial_tests {
    use super::*;

    #[test]
    fn test_technical_denial_is_retryable() {
        let interpretation = DenialInterpreter::interpret("001", None);
        assert_eq!(interpretation.category, DenialCategory::Technical);
        assert_eq!(interpretation.action, DenialAction::FixXml);
        assert!(interpretation.can_retry);
        assert!(!interpretation.requires_action);
        assert_eq!(interpretation.severity(), Severity::Critical);
    }

    #[test]
    fn test_business_denial_requires_action() {
        let interpretation = DenialInterpreter::interpret("102", Some("Precisa de autorização"));
        assert_eq!(interpretation.category, DenialCategory::Business);
        assert_eq!(interpretation.action, DenialAction::RequestAuthorization);
        assert!(!interpretation.can_retry);
        assert!(interpretation.requires_action);
        assert_eq!(interpretation.severity(), Severity::High);
        assert_eq!(interpretation.message, "Precisa de autorização");
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(
            DenialInterpreter::interpret("105", None).severity(),
            Severity::Medium
        );
        assert_eq!(
            DenialInterpreter::interpret("201", None).severity(),
            Severity::Medium
        );
        assert_eq!(
            DenialInterpreter::interpret("301", None).severity(),
            Severity::Low
        );
    }

    #[test]
    fn test_unknown_code_inferred_from_message() {
        let technical =
            DenialInterpreter::interpret("999", Some("Schema validation failed for element"));
        assert_eq!(technical.category, DenialCategory::Technical);
        assert!(technical.can_retry);
        assert!(technical.requires_action);

        let business = DenialInterpreter::interpret("998", Some("Service not covered by plan"));
        assert_eq!(business.category, DenialCategory::Business);
        assert!(!business.can_retry);

        let unknown = DenialInterpreter::interpret("997", None);
        assert_eq!(unknown.category, DenialCategory::Unknown);
        assert_eq!(unknown.action, DenialAction::ContactSupport);
    }

    #[test]
    fn test_interpret_many_summarizes() {
        let denials = vec![
            DenialRecord {
                code: Some("001".to_string()),
                description: None,
                value: None,
            },
            DenialRecord {
                code: Some("102".to_string()),
                description: None,
                value: None,
            },
        ];
        let (interpreted, summary) = DenialInterpreter::interpret_many(&denials);

        assert_eq!(interpreted.len(), 2);
        assert_eq!(summary.total, 2);
        assert!(summary.has_technical);
        assert!(summary.has_business);
        assert!(!summary.can_retry_all);
        assert!(summary.requires_action);
        assert_eq!(summary.by_category[&DenialCategory::Technical], 1);
        assert!(summary.actions_needed.contains(&DenialAction::FixXml));
    }

    #[test]
    fn test_resolution_suggestions() {
        let steps = DenialInterpreter::suggest_resolution("002");
        assert!(steps.iter().any(|s| s.contains("XSD")));

        let fallback = DenialInterpreter::suggest_resolution("999");
        assert_eq!(fallback.len(), 1);
    }

    #[test]
    fn test_categorize_by_severity() {
        let interpreted = vec![
            DenialInterpreter::interpret("001", None),
            DenialInterpreter::interpret("301", None),
        ];
        let buckets = DenialInterpreter::categorize_by_severity(&interpreted);
        assert_eq!(buckets[&Severity::Critical].len(), 1);
        assert_eq!(buckets[&Severity::Low].len(), 1);
    }

    #[test]
    fn test_statement_denial_flows_into_interpreter() {
        let statement = StatementParser::parse(STATEMENT_XML).unwrap();
        let denials: Vec<DenialRecord> = statement.all_denials().cloned().collect();
        let (interpreted, summary) = DenialInterpreter::interpret_many(&denials);

        assert_eq!(interpreted[0].code, "001");
        assert!(interpreted[0].can_retry);
        assert_eq!(interpreted[0].action, DenialAction::FixXml);
        assert!(summary.can_retry_all);
    }
}
