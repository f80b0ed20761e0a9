//! SOAP 1.1 sender
//!
//! Wraps the rendered batch in a SOAP 1.1 envelope, POSTs it with the
//! configured `SOAPAction`, and reads the protocol number out of the response
//! body. A SOAP Fault is a delivery failure carrying the fault string.

use std::time::Duration;

use async_trait::async_trait;

use wire_format::Element;

use crate::config::{AuthConfig, EndpointConfig, TransportMethod};
use crate::sender::{BatchDispatch, DeliveryOutcome, TransportSender};

const PROTOCOL_ELEMENTS: &[&str] = &[
    "numeroProtocolo",
    "numeroProtocoloRecebimento",
    "protocolo",
];

pub struct SoapSender;

impl SoapSender {
    fn envelope(xml: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
                "<soapenv:Header/>",
                "<soapenv:Body>",
                "<tiss:tissLoteGuias xmlns:tiss=\"{ns}\">",
                "<![CDATA[{payload}]]>",
                "</tiss:tissLoteGuias>",
                "</soapenv:Body>",
                "</soapenv:Envelope>"
            ),
            ns = wire_format::render::TISS_NAMESPACE,
            payload = xml,
        )
    }
}

#[async_trait]
impl TransportSender for SoapSender {
    fn method(&self) -> TransportMethod {
        TransportMethod::Soap
    }

    async fn send(&self, dispatch: &BatchDispatch, config: &EndpointConfig) -> DeliveryOutcome {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => return DeliveryOutcome::failed(format!("http client: {e}")),
        };

        let mut request = client
            .post(&config.url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header(
                "SOAPAction",
                config.soap_action.as_deref().unwrap_or_default(),
            )
            .body(Self::envelope(&dispatch.xml));
        request = apply_auth(request, &config.auth);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(batch = %dispatch.batch_number, error = %e, "SOAP send failed");
                return DeliveryOutcome::failed(format!("SOAP request failed: {e}"));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return DeliveryOutcome::failed(format!("SOAP response read failed: {e}")),
        };

        // Faults arrive as HTTP 500 with a Fault element; check both.
        if let Ok(root) = Element::parse(&body) {
            if let Some(fault) = root.find("Fault") {
                let reason = fault
                    .first_text(&["faultstring", "Reason"])
                    .unwrap_or_else(|| "SOAP fault".to_string());
                return DeliveryOutcome::failed(reason);
            }
            if !status.is_success() {
                return DeliveryOutcome::failed(format!("SOAP endpoint returned {status}"));
            }
            let tracking = root.first_text(PROTOCOL_ELEMENTS);
            tracing::info!(
                batch = %dispatch.batch_number,
                protocol = tracking.as_deref().unwrap_or("-"),
                "batch delivered over SOAP"
            );
            return DeliveryOutcome::ok(tracking);
        }

        if status.is_success() {
            // Accepted but not XML; delivery stands, tracking arrives later
            DeliveryOutcome::ok(None)
        } else {
            DeliveryOutcome::failed(format!("SOAP endpoint returned {status}"))
        }
    }
}

pub(crate) fn apply_auth(
    request: reqwest::RequestBuilder,
    auth: &AuthConfig,
) -> reqwest::RequestBuilder {
    match auth {
        AuthConfig::None => request,
        AuthConfig::Bearer { token } => request.bearer_auth(token),
        AuthConfig::Basic { username, password } => request.basic_auth(username, Some(password)),
    }
}
