//! Pre-built Test Fixtures
//!
//! Consistent, predictable test data: identity blocks with valid check
//! widths, inbound response documents as operators actually send them, and
//! the path to the bundled schema artifacts.

use std::path::PathBuf;

use domain_guides::{
    BeneficiaryIdentification, ContractedParty, OperatorIdentification, ProviderIdentification,
};

/// Directory holding the bundled versioned schema artifacts
pub fn schema_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../wire_format/schemas")
}

/// Fixture for identity blocks
pub struct IdentityFixtures;

impl IdentityFixtures {
    pub fn provider() -> ProviderIdentification {
        ProviderIdentification {
            cnpj: "12345678000190".to_string(),
            name: "Clinica Exemplo Ltda".to_string(),
            operator_assigned_code: Some("PRE001".to_string()),
        }
    }

    pub fn operator() -> OperatorIdentification {
        OperatorIdentification {
            cnpj: "98765432000109".to_string(),
            name: "Operadora Exemplo S.A.".to_string(),
            ans_registration: "123456".to_string(),
        }
    }

    pub fn beneficiary() -> BeneficiaryIdentification {
        BeneficiaryIdentification {
            card_number: "00012345678".to_string(),
            cpf: Some("11144477735".to_string()),
            name: "Maria Exemplo".to_string(),
        }
    }

    pub fn contracted() -> ContractedParty {
        ContractedParty {
            code: Some("PRE001".to_string()),
            name: "Clinica Exemplo Ltda".to_string(),
            cnpj: Some("12345678000190".to_string()),
        }
    }
}

/// Fixture for inbound operator documents
pub struct ResponseFixtures;

impl ResponseFixtures {
    /// A protocol receipt acknowledging batch LOTE42
    pub fn protocol_receipt() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ans:mensagemTISS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
    <ans:protocoloRecebimento>
        <ans:numeroProtocolo>PROT20250314001</ans:numeroProtocolo>
        <ans:dataProtocolo>2025-03-14</ans:dataProtocolo>
        <ans:horaProtocolo>09:30:00</ans:horaProtocolo>
        <ans:numeroLote>LOTE42</ans:numeroLote>
        <ans:cnpjOperadora>98765432000109</ans:cnpjOperadora>
        <ans:situacao>RECEBIDO</ans:situacao>
    </ans:protocoloRecebimento>
</ans:mensagemTISS>"#
    }

    /// A return statement denying one guide with a technical glosa (code 001)
    pub fn statement_with_technical_denial() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ans:mensagemTISS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
    <ans:demonstrativoRetorno>
        <ans:numeroDemonstrativo>DEM001</ans:numeroDemonstrativo>
        <ans:dataEmissao>2025-03-20</ans:dataEmissao>
        <ans:cnpjOperadora>98765432000109</ans:cnpjOperadora>
        <ans:valorTotal>150.00</ans:valorTotal>
        <ans:valorRejeitado>150.00</ans:valorRejeitado>
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
</ans:mensagemTISS>"#
    }

    /// A payment statement settling one prior statement
    pub fn payment_statement() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ans:mensagemTISS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
    <ans:demonstrativoPagamento>
        <ans:numeroPagamento>PAG777</ans:numeroPagamento>
        <ans:dataPagamento>2025-04-01</ans:dataPagamento>
        <ans:cnpjOperadora>98765432000109</ans:cnpjOperadora>
        <ans:valorTotal>200.00</ans:valorTotal>
        <ans:valorLiquido>190.00</ans:valorLiquido>
        <ans:demonstrativo>
            <ans:numeroDemonstrativo>DEM001</ans:numeroDemonstrativo>
            <ans:valor>200.00</ans:valor>
        </ans:demonstrativo>
    </ans:demonstrativoPagamento>
</ans:mensagemTISS>"#
    }
}
