//! Tests for the in-memory storage adapters

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use core_kernel::{ClinicId, Money};
use domain_batch::{Batch, BatchAssembler, SubmissionStatus};
use domain_guides::{
    BeneficiaryIdentification, ContractedParty, Guide, GuideBuilder, GuideKind, GuidePayload,
    KindDetail, OperatorIdentification, ProcedureLine, ProviderIdentification,
};
use infra_store::{
    AuditAction, AuditEntry, AuditLog, BatchStore, BatchUpdate, GuideStore, MemoryAuditLog,
    MemoryBatchStore, MemoryGuideStore, StoreError,
};
use infra_transport::TransportMethod;
use wire_format::VersionRegistry;

fn guide(clinic: ClinicId) -> Guide {
    let payload = GuidePayload {
        provider: ProviderIdentification {
            cnpj: "12345678000190".to_string(),
            name: "Clinica Exemplo".to_string(),
            operator_assigned_code: None,
        },
        operator: OperatorIdentification {
            cnpj: "98765432000109".to_string(),
            name: "Operadora Exemplo".to_string(),
            ans_registration: "123456".to_string(),
        },
        beneficiary: BeneficiaryIdentification {
            card_number: "00012345".to_string(),
            cpf: None,
            name: "Paciente Exemplo".to_string(),
        },
        contracted: ContractedParty {
            code: None,
            name: "Clinica Exemplo".to_string(),
            cnpj: None,
        },
        procedures: vec![ProcedureLine {
            tuss_code: "10101012".to_string(),
            description: "Consulta".to_string(),
            quantity: 1,
            unit_value: Money::brl(dec!(150.00)),
        }],
        declared_total: Money::brl(dec!(150.00)),
        detail: KindDetail::Consultation,
        extra: None,
    };
    GuideBuilder::new(Arc::new(VersionRegistry::new("schemas")))
        .build(clinic, payload, None)
        .unwrap()
}

fn batch(clinic: ClinicId) -> Batch {
    BatchAssembler::assemble(
        clinic,
        &[guide(clinic)],
        GuideKind::Consultation,
        TransportMethod::Manual,
    )
    .unwrap()
}

mod guide_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_update_roundtrip() {
        let store = MemoryGuideStore::new();
        let clinic = ClinicId::new_v7();
        let mut g = guide(clinic);
        let id = g.id;

        store.insert(g.clone()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().guide_number, g.guide_number);

        g.lock().unwrap();
        store.update(g).await.unwrap();
        assert!(store.get(id).await.unwrap().locked);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryGuideStore::new();
        let g = guide(ClinicId::new_v7());
        store.insert(g.clone()).await.unwrap();
        assert!(matches!(
            store.insert(g).await,
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_many_fails_on_any_missing_id() {
        let store = MemoryGuideStore::new();
        let g = guide(ClinicId::new_v7());
        let present = g.id;
        store.insert(g).await.unwrap();

        let missing = core_kernel::GuideId::new_v7();
        assert!(matches!(
            store.get_many(&[present, missing]).await,
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.get_many(&[present]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_scoped_to_clinic() {
        let store = MemoryGuideStore::new();
        let clinic = ClinicId::new_v7();
        store.insert(guide(clinic)).await.unwrap();
        store.insert(guide(clinic)).await.unwrap();
        store.insert(guide(ClinicId::new_v7())).await.unwrap();

        assert_eq!(store.list_for_clinic(clinic).await.unwrap().len(), 2);
    }
}

mod batch_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_submission_applies_failure() {
        let store = MemoryBatchStore::new();
        let b = batch(ClinicId::new_v7());
        let id = b.id;
        store.insert(b).await.unwrap();

        let updated = store
            .update_submission(
                id,
                BatchUpdate::RecordFailure {
                    error: "endpoint unreachable".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, SubmissionStatus::Error);
        assert_eq!(updated.retry_count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_failures_never_lose_counts() {
        let store = Arc::new(MemoryBatchStore::new());
        let b = batch(ClinicId::new_v7());
        let mut b = b;
        b.max_retries = 100;
        let id = b.id;
        store.insert(b).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .update_submission(
                        id,
                        BatchUpdate::RecordFailure {
                            error: "transient".to_string(),
                        },
                    )
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.get(id).await.unwrap().retry_count, 20);
    }

    #[tokio::test]
    async fn test_due_for_retry_filters_by_time_and_budget() {
        let store = MemoryBatchStore::new();
        let b = batch(ClinicId::new_v7());
        let id = b.id;
        store.insert(b).await.unwrap();

        store
            .update_submission(
                id,
                BatchUpdate::RecordFailure {
                    error: "down".to_string(),
                },
            )
            .await
            .unwrap();

        // First retry is scheduled one minute out
        let now = Utc::now();
        assert!(store.due_for_retry(now).await.unwrap().is_empty());
        let later = now + Duration::seconds(61);
        assert_eq!(store.due_for_retry(later).await.unwrap().len(), 1);

        store
            .update_submission(
                id,
                BatchUpdate::RecordSuccess {
                    protocol_number: Some("PROTO-1".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(store.due_for_retry(later).await.unwrap().is_empty());
    }
}

mod audit_log_tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_filtered_by_entity() {
        let log = MemoryAuditLog::new();
        log.append(AuditEntry::new(
            "system",
            AuditAction::Create,
            "guide",
            "G1",
            None,
        ))
        .await
        .unwrap();
        log.append(AuditEntry::new(
            "system",
            AuditAction::Lock,
            "guide",
            "G1",
            Some(serde_json::json!({"locked": true})),
        ))
        .await
        .unwrap();
        log.append(AuditEntry::new(
            "system",
            AuditAction::Submit,
            "batch",
            "LOTE1",
            None,
        ))
        .await
        .unwrap();

        let entries = log.entries_for("guide", "G1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Create);
        assert_eq!(entries[1].action, AuditAction::Lock);
        assert_eq!(log.entries_for("batch", "LOTE1").await.unwrap().len(), 1);
    }
}
