//! Guide body rendering
//!
//! Renders the XML body for one guide. The element name varies by kind; the
//! block structure is shared, with one optional kind-specific detail block.
//! Bodies are embedded verbatim into the batch envelope by the assembler.

use quick_xml::Writer;

use wire_format::render::{close, leaf, open};
use wire_format::WireError;

use crate::error::GuideError;
use crate::guide::Guide;
use crate::payload::KindDetail;

/// Renders the guide's XML body
pub fn render_guide_body(guide: &Guide) -> Result<String, GuideError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    write_body(&mut writer, guide).map_err(|e| GuideError::Render(e.to_string()))?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| GuideError::Render(format!("guide body is not valid UTF-8: {e}")))
}

fn write_body(w: &mut Writer<Vec<u8>>, guide: &Guide) -> Result<(), WireError> {
    let payload = &guide.payload;
    let element = guide.kind.xml_element();

    open(w, element)?;
    leaf(w, "ans:numeroGuiaPrestador", &guide.guide_number)?;
    leaf(w, "ans:registroANS", &payload.operator.ans_registration)?;

    open(w, "ans:dadosPrestador")?;
    leaf(w, "ans:cnpjPrestador", &payload.provider.cnpj)?;
    leaf(w, "ans:nomePrestador", &payload.provider.name)?;
    if let Some(code) = &payload.provider.operator_assigned_code {
        leaf(w, "ans:codigoPrestadorNaOperadora", code)?;
    }
    close(w, "ans:dadosPrestador")?;

    open(w, "ans:dadosBeneficiario")?;
    leaf(w, "ans:numeroCarteira", &payload.beneficiary.card_number)?;
    if let Some(cpf) = &payload.beneficiary.cpf {
        leaf(w, "ans:numeroCPF", cpf)?;
    }
    leaf(w, "ans:nomeBeneficiario", &payload.beneficiary.name)?;
    close(w, "ans:dadosBeneficiario")?;

    open(w, "ans:dadosContratado")?;
    if let Some(code) = &payload.contracted.code {
        leaf(w, "ans:codigoContratado", code)?;
    }
    leaf(w, "ans:nomeContratado", &payload.contracted.name)?;
    if let Some(cnpj) = &payload.contracted.cnpj {
        leaf(w, "ans:cnpjContratado", cnpj)?;
    }
    close(w, "ans:dadosContratado")?;

    render_detail(w, &payload.detail)?;

    open(w, "ans:procedimentosExecutados")?;
    for line in &payload.procedures {
        open(w, "ans:procedimento")?;
        leaf(w, "ans:codigoProcedimento", &line.tuss_code)?;
        leaf(w, "ans:descricaoProcedimento", &line.description)?;
        leaf(w, "ans:quantidadeExecutada", &line.quantity.to_string())?;
        leaf(w, "ans:valorUnitario", &line.unit_value.wire_format())?;
        leaf(w, "ans:valorTotal", &line.total().wire_format())?;
        close(w, "ans:procedimento")?;
    }
    close(w, "ans:procedimentosExecutados")?;

    leaf(w, "ans:valorTotalGeral", &guide.total.wire_format())?;
    close(w, element)?;
    Ok(())
}

fn render_detail(w: &mut Writer<Vec<u8>>, detail: &KindDetail) -> Result<(), WireError> {
    match detail {
        KindDetail::Consultation => Ok(()),
        KindDetail::Sadt {
            requesting_professional,
            professional_council,
            attendance_character,
        } => {
            open(w, "ans:dadosSolicitacao")?;
            leaf(w, "ans:nomeProfissionalSolicitante", requesting_professional)?;
            leaf(w, "ans:conselhoProfissional", professional_council)?;
            if let Some(character) = attendance_character {
                leaf(w, "ans:caraterAtendimento", character)?;
            }
            close(w, "ans:dadosSolicitacao")
        }
        KindDetail::Hospitalization {
            admission_date,
            discharge_date,
            regime,
        } => {
            open(w, "ans:dadosInternacao")?;
            leaf(
                w,
                "ans:dataInicioFaturamento",
                &admission_date.format("%Y-%m-%d").to_string(),
            )?;
            if let Some(discharge) = discharge_date {
                leaf(
                    w,
                    "ans:dataFimFaturamento",
                    &discharge.format("%Y-%m-%d").to_string(),
                )?;
            }
            leaf(w, "ans:regimeInternacao", regime)?;
            close(w, "ans:dadosInternacao")
        }
        KindDetail::IndividualFee {
            professional_council,
            council_number,
        } => {
            open(w, "ans:dadosHonorario")?;
            leaf(w, "ans:conselhoProfissional", professional_council)?;
            leaf(w, "ans:numeroConselho", council_number)?;
            close(w, "ans:dadosHonorario")
        }
        KindDetail::PreAuthorization {
            request_date,
            clinical_indication,
        } => {
            open(w, "ans:dadosAutorizacao")?;
            leaf(
                w,
                "ans:dataSolicitacao",
                &request_date.format("%Y-%m-%d").to_string(),
            )?;
            leaf(w, "ans:indicacaoClinica", clinical_indication)?;
            close(w, "ans:dadosAutorizacao")
        }
    }
}
