//! Batch envelope rendering
//!
//! Renders the `ans:mensagemTISS` envelope: a header carrying the declared
//! version, transaction type, and timestamp; the origin/destination
//! identification block (provider CNPJ → operator ANS registration); and the
//! guide batch with each member guide's body embedded as-is.

use std::io::Write;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::WireError;

pub const TISS_NAMESPACE: &str = "http://www.ans.gov.br/padroes/tiss/schemas";

/// Header data for a batch envelope
#[derive(Debug, Clone)]
pub struct EnvelopeHeader {
    pub version: String,
    pub transaction_type: String,
    pub timestamp: DateTime<Utc>,
    pub provider_cnpj: String,
    pub operator_ans_registration: String,
}

impl EnvelopeHeader {
    /// Header for a guide batch submission
    pub fn guide_batch(
        version: impl Into<String>,
        timestamp: DateTime<Utc>,
        provider_cnpj: impl Into<String>,
        operator_ans_registration: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            transaction_type: "ENVIO_LOTE_GUIAS".to_string(),
            timestamp,
            provider_cnpj: provider_cnpj.into(),
            operator_ans_registration: operator_ans_registration.into(),
        }
    }
}

/// Renders the batch envelope with each guide's pre-rendered XML body embedded
pub fn render_envelope(
    header: &EnvelopeHeader,
    batch_number: &str,
    guide_bodies: &[String],
) -> Result<String, WireError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 4);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("ans:mensagemTISS");
    root.push_attribute(("xmlns:ans", TISS_NAMESPACE));
    w.write_event(Event::Start(root))?;

    open(&mut w, "ans:cabecalho")?;
    open(&mut w, "ans:identificacaoTransacao")?;
    leaf(&mut w, "ans:tipoTransacao", &header.transaction_type)?;
    leaf(&mut w, "ans:sequencialTransacao", batch_number)?;
    leaf(
        &mut w,
        "ans:dataRegistroTransacao",
        &header.timestamp.format("%Y-%m-%d").to_string(),
    )?;
    leaf(
        &mut w,
        "ans:horaRegistroTransacao",
        &header.timestamp.format("%H:%M:%S").to_string(),
    )?;
    close(&mut w, "ans:identificacaoTransacao")?;

    open(&mut w, "ans:origem")?;
    open(&mut w, "ans:identificacaoPrestador")?;
    leaf(&mut w, "ans:CNPJ", &header.provider_cnpj)?;
    close(&mut w, "ans:identificacaoPrestador")?;
    close(&mut w, "ans:origem")?;

    open(&mut w, "ans:destino")?;
    leaf(&mut w, "ans:registroANS", &header.operator_ans_registration)?;
    close(&mut w, "ans:destino")?;

    leaf(&mut w, "ans:versaoPadrao", &header.version)?;
    close(&mut w, "ans:cabecalho")?;

    open(&mut w, "ans:prestadorParaOperadora")?;
    open(&mut w, "ans:loteGuias")?;
    leaf(&mut w, "ans:numeroLoteGuia", batch_number)?;
    open(&mut w, "ans:guiasTISS")?;
    for body in guide_bodies {
        // Guide bodies are already rendered XML
        w.write_event(Event::Text(BytesText::from_escaped(body.as_str())))?;
    }
    close(&mut w, "ans:guiasTISS")?;
    close(&mut w, "ans:loteGuias")?;
    close(&mut w, "ans:prestadorParaOperadora")?;

    w.write_event(Event::End(BytesEnd::new("ans:mensagemTISS")))?;

    String::from_utf8(w.into_inner())
        .map_err(|e| WireError::Render(format!("envelope is not valid UTF-8: {e}")))
}

/// Writes an opening tag
pub fn open<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), WireError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

/// Writes a closing tag
pub fn close<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), WireError> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Writes a leaf element with escaped text content
pub fn leaf<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), WireError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
