//! REST sender
//!
//! POSTs the rendered batch as `application/xml`. Tracking numbers are pulled
//! from a JSON body (`protocolo` or `protocol_number`) when the endpoint
//! returns one, otherwise from a bare text body.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{EndpointConfig, TransportMethod};
use crate::sender::{BatchDispatch, DeliveryOutcome, TransportSender};
use crate::soap::apply_auth;

pub struct RestSender;

#[async_trait]
impl TransportSender for RestSender {
    fn method(&self) -> TransportMethod {
        TransportMethod::Rest
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
            .header("Content-Type", "application/xml")
            .body(dispatch.xml.clone());
        for (name, value) in &config.params {
            request = request.header(name.as_str(), value.as_str());
        }
        request = apply_auth(request, &config.auth);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(batch = %dispatch.batch_number, error = %e, "REST send failed");
                return DeliveryOutcome::failed(format!("REST request failed: {e}"));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return DeliveryOutcome::failed(format!("REST response read failed: {e}")),
        };

        if !status.is_success() {
            return DeliveryOutcome::failed(format!(
                "REST endpoint returned {status}: {}",
                body.chars().take(200).collect::<String>()
            ));
        }

        let tracking = extract_tracking(&body);
        tracing::info!(
            batch = %dispatch.batch_number,
            protocol = tracking.as_deref().unwrap_or("-"),
            "batch delivered over REST"
        );
        DeliveryOutcome::ok(tracking)
    }
}

fn extract_tracking(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["protocolo", "protocol_number"] {
            if let Some(value) = json.get(key) {
                if let Some(text) = value.as_str() {
                    return Some(text.to_string());
                }
                if value.is_number() {
                    return Some(value.to_string());
                }
            }
        }
        return None;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        None
    } else {
        Some(trimmed.to_string())
    }
}
