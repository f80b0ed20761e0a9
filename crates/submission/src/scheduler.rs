//! Retry scheduler
//!
//! Periodically scans for batches whose next retry time has passed and
//! re-submits them. Runs until the shutdown signal flips.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use infra_store::BatchStore;
use infra_transport::{EndpointConfig, TransportMethod};

use crate::service::SubmissionService;

pub struct RetryScheduler {
    service: Arc<SubmissionService>,
    batches: Arc<dyn BatchStore>,
    endpoints: HashMap<TransportMethod, EndpointConfig>,
    poll_interval: Duration,
}

impl RetryScheduler {
    pub fn new(
        service: Arc<SubmissionService>,
        batches: Arc<dyn BatchStore>,
        endpoints: HashMap<TransportMethod, EndpointConfig>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            service,
            batches,
            endpoints,
            poll_interval,
        }
    }

    /// Runs the scan loop until `shutdown` observes `true`
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.scan_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("retry scheduler stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One scan pass: re-submit every batch that is due
    pub async fn scan_once(&self) {
        let due = match self.batches.due_for_retry(Utc::now()).await {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(error = %e, "retry scan failed");
                return;
            }
        };
        for batch in due {
            let Some(endpoint) = self.endpoints.get(&batch.transport_method) else {
                tracing::warn!(
                    batch = %batch.batch_number,
                    transport = %batch.transport_method,
                    "no endpoint configured, skipping retry"
                );
                continue;
            };
            match self.service.retry_batch(batch.id, endpoint).await {
                Ok(updated) => {
                    tracing::info!(
                        batch = %updated.batch_number,
                        status = ?updated.status,
                        attempt = updated.retry_count,
                        "retry attempted"
                    );
                }
                Err(e) => {
                    tracing::error!(batch = %batch.batch_number, error = %e, "retry failed");
                }
            }
        }
    }
}
