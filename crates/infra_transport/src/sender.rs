//! Transport sender port
//!
//! Delivery failures are data, not errors: a send attempt always yields a
//! [`DeliveryOutcome`], and the caller decides whether to schedule a retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{EndpointConfig, TransportMethod};

/// What a sender needs to deliver one batch
#[derive(Debug, Clone)]
pub struct BatchDispatch {
    pub batch_number: String,
    pub xml: String,
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub success: bool,
    /// Receiver-assigned tracking identifier (protocol number, file name)
    pub tracking_number: Option<String>,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn ok(tracking_number: Option<String>) -> Self {
        Self {
            success: true,
            tracking_number,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tracking_number: None,
            error: Some(error.into()),
        }
    }
}

/// A delivery channel for rendered batches
#[async_trait]
pub trait TransportSender: Send + Sync {
    /// The method this sender implements
    fn method(&self) -> TransportMethod;

    /// Attempts delivery once. Never panics, never hangs past the endpoint's
    /// configured deadline.
    async fn send(&self, dispatch: &BatchDispatch, config: &EndpointConfig) -> DeliveryOutcome;
}

/// Manual delivery: the batch is handed off out of band (portal upload,
/// e-mail), so the attempt itself always succeeds and no tracking number
/// exists until the operator responds.
pub struct ManualSender;

#[async_trait]
impl TransportSender for ManualSender {
    fn method(&self) -> TransportMethod {
        TransportMethod::Manual
    }

    async fn send(&self, dispatch: &BatchDispatch, _config: &EndpointConfig) -> DeliveryOutcome {
        tracing::info!(batch = %dispatch.batch_number, "batch staged for manual delivery");
        DeliveryOutcome::ok(None)
    }
}
