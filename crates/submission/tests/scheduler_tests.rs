//! Retry scheduler behavior
//!
//! The scheduler owns no state of its own: it scans the batch store for due
//! batches and hands each one back to the service. These tests drive the
//! scan directly and exercise the shutdown path of the loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as Delay, Utc};
use tokio::sync::watch;

use core_kernel::{BatchId, ClinicId};
use domain_batch::SubmissionStatus;
use domain_guides::GuideKind;
use infra_store::{
    AuditLog, BatchStore, GuideStore, MemoryAuditLog, MemoryBatchStore, MemoryGuideStore,
};
use infra_transport::{EndpointConfig, TransportMethod};
use submission::{RetryScheduler, SubmissionConfig, SubmissionService};
use test_utils::{schema_dir, GuidePayloadBuilder};

struct Harness {
    service: Arc<SubmissionService>,
    batches: Arc<MemoryBatchStore>,
    clinic: ClinicId,
}

fn harness() -> Harness {
    let config = SubmissionConfig {
        schema_dir: schema_dir().to_string_lossy().into_owned(),
        ..SubmissionConfig::default()
    };
    let guides = Arc::new(MemoryGuideStore::new());
    let batches = Arc::new(MemoryBatchStore::new());
    let audit: Arc<dyn AuditLog> = Arc::new(MemoryAuditLog::new());
    let service = Arc::new(SubmissionService::new(
        &config,
        Arc::clone(&guides) as Arc<dyn GuideStore>,
        Arc::clone(&batches) as Arc<dyn BatchStore>,
        audit,
    ));
    Harness {
        service,
        batches,
        clinic: ClinicId::new_v7(),
    }
}

fn scheduler(h: &Harness, endpoints: HashMap<TransportMethod, EndpointConfig>) -> RetryScheduler {
    RetryScheduler::new(
        Arc::clone(&h.service),
        Arc::clone(&h.batches) as Arc<dyn BatchStore>,
        endpoints,
        Duration::from_secs(3600),
    )
}

fn manual_endpoints() -> HashMap<TransportMethod, EndpointConfig> {
    HashMap::from([(
        TransportMethod::Manual,
        EndpointConfig::for_method(TransportMethod::Manual),
    )])
}

/// A manual-transport batch parked in Error with the given retry slot
async fn failed_batch(h: &Harness, next_retry_at: DateTime<Utc>) -> BatchId {
    let guide = h
        .service
        .create_guide(h.clinic, GuidePayloadBuilder::new().build(), None)
        .await
        .unwrap();
    let assembled = h
        .service
        .assemble_batch(
            h.clinic,
            &[guide.id],
            GuideKind::Consultation,
            TransportMethod::Manual,
        )
        .await
        .unwrap();

    let mut failed = h.batches.get(assembled.id).await.unwrap();
    failed.record_failure("endpoint unreachable").unwrap();
    failed.next_retry_at = Some(next_retry_at);
    failed.id = BatchId::new_v7();
    h.batches.insert(failed.clone()).await.unwrap();
    failed.id
}

#[tokio::test]
async fn test_scan_resubmits_due_batches() {
    let h = harness();
    let id = failed_batch(&h, Utc::now() - Delay::seconds(1)).await;

    scheduler(&h, manual_endpoints()).scan_once().await;

    let stored = h.batches.get(id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Submitted);
    assert!(stored.sent_at.is_some());
    assert!(stored.next_retry_at.is_none());
}

#[tokio::test]
async fn test_scan_skips_batches_that_are_not_due() {
    let h = harness();
    let id = failed_batch(&h, Utc::now() + Delay::seconds(3600)).await;

    scheduler(&h, manual_endpoints()).scan_once().await;

    let stored = h.batches.get(id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Error);
    assert_eq!(stored.retry_count, 1);
}

#[tokio::test]
async fn test_scan_skips_unconfigured_transport() {
    let h = harness();
    let id = failed_batch(&h, Utc::now() - Delay::seconds(1)).await;

    scheduler(&h, HashMap::new()).scan_once().await;

    let stored = h.batches.get(id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Error);
    assert_eq!(stored.retry_count, 1);
}

#[tokio::test]
async fn test_run_exits_on_shutdown_signal() {
    let h = harness();
    let scheduler = Arc::new(scheduler(&h, manual_endpoints()));
    let (shutdown, rx) = watch::channel(false);

    let task = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run(rx).await }
    });

    shutdown.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scheduler stops on shutdown")
        .unwrap();
}
