//! Integration test: identity ledger lifecycle across crates.
//!
//! create → signed appends → integrity check → full audit, plus the
//! tamper cases the anchor index exists to catch.

use sigil_core::{AnchorRecord, EventKind, IdentityStatus, LedgerEvent, GENESIS_PREVIOUS_HASH};
use sigil_identity::{IdentityError, SignedEvent};
use sigil_store::IdentityStore;
use sigil_integration_tests::{memory_service, sqlite_service, temp_path, TestSubject};

#[tokio::test]
async fn test_full_ledger_lifecycle() {
    let (svc, _store) = memory_service();
    let subject = TestSubject::generate();
    let id = svc.create_identity(&subject.public_pem).await.unwrap();

    let (p1, s1) = subject.signed_payload(id.as_str(), 2, "n1");
    svc.append_signed_event(&id, SignedEvent::UpdateVerification, p1, &s1)
        .await
        .unwrap();
    let (p2, s2) = subject.signed_payload(id.as_str(), 2, "n2");
    svc.append_signed_event(
        &id,
        SignedEvent::Suspend {
            reason: Some("reported stolen".into()),
        },
        p2,
        &s2,
    )
    .await
    .unwrap();

    let chain = svc.read_ledger(&id).await.unwrap();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0].index, 0);
    assert_eq!(chain[0].previous_hash, GENESIS_PREVIOUS_HASH);
    for i in 1..chain.len() {
        assert_eq!(chain[i].previous_hash, chain[i - 1].compute_hash().unwrap());
    }
    match &chain[2].event {
        LedgerEvent::StatusSuspended(d) => {
            assert_eq!(d.reason.as_deref(), Some("reported stolen"))
        }
        other => panic!("unexpected event {:?}", other.kind()),
    }

    let report = svc.check_integrity(&id).await.unwrap();
    assert!(report.valid);
    assert_eq!(report.status, IdentityStatus::Suspended);
    assert_eq!(report.verification_level, 2);
    assert_eq!(report.block_count, 3);
    assert_eq!(svc.verify_chain(&id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_invalid_signature_is_rejected_without_side_effects() {
    let (svc, _store) = memory_service();
    let owner = TestSubject::generate();
    let intruder = TestSubject::generate();
    let id = svc.create_identity(&owner.public_pem).await.unwrap();
    let before = svc.read_ledger(&id).await.unwrap();

    let (payload, signature) = intruder.signed_payload(id.as_str(), 9, "n1");
    let err = svc
        .append_signed_event(&id, SignedEvent::UpdateVerification, payload, &signature)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::SignatureInvalid));
    assert_eq!(svc.read_ledger(&id).await.unwrap(), before);
    assert!(svc.check_integrity(&id).await.unwrap().valid);
}

#[tokio::test]
async fn test_altered_anchor_is_detected() {
    let (svc, store) = memory_service();
    let subject = TestSubject::generate();
    let id = svc.create_identity(&subject.public_pem).await.unwrap();

    store
        .upsert_anchor(&AnchorRecord::new(id.clone(), "0".repeat(64)))
        .await
        .unwrap();
    let report = svc.check_integrity(&id).await.unwrap();
    assert!(!report.valid);
    assert!(matches!(
        svc.verify_chain(&id).await,
        Err(IdentityError::IntegrityMismatch { .. })
    ));
}

#[tokio::test]
async fn test_out_of_band_edit_is_detected() {
    let (svc, store) = memory_service();
    let subject = TestSubject::generate();
    let id = svc.create_identity(&subject.public_pem).await.unwrap();
    let (p1, s1) = subject.signed_payload(id.as_str(), 1, "n1");
    svc.append_signed_event(&id, SignedEvent::UpdateVerification, p1, &s1)
        .await
        .unwrap();

    // Raise the recorded level without a new signature.
    let mut chain = svc.read_ledger(&id).await.unwrap();
    if let LedgerEvent::UpdateVerification(d) = &mut chain[1].event {
        d.payload.level = 5;
    }
    store.replace_ledger(&id, chain);

    let report = svc.check_integrity(&id).await.unwrap();
    assert!(!report.valid);
    assert!(matches!(
        svc.verify_chain(&id).await,
        Err(IdentityError::IntegrityMismatch { index: 1, .. })
    ));
}

#[tokio::test]
async fn test_ledger_survives_reopen_on_sqlite() {
    let dir = temp_path("ledger-flow");
    let db = dir.join("sigil.db");
    let subject = TestSubject::generate();

    let id = {
        let svc = sqlite_service(&db);
        let id = svc.create_identity(&subject.public_pem).await.unwrap();
        let (p1, s1) = subject.signed_payload(id.as_str(), 3, "n1");
        svc.append_signed_event(&id, SignedEvent::UpdateVerification, p1, &s1)
            .await
            .unwrap();
        id
    };

    let svc = sqlite_service(&db);
    let chain = svc.read_ledger(&id).await.unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[1].kind(), EventKind::UpdateVerification);
    assert!(chain.iter().all(|b| b.has_valid_hash()));

    let report = svc.check_integrity(&id).await.unwrap();
    assert!(report.valid);
    assert_eq!(report.verification_level, 3);
    assert_eq!(svc.verify_chain(&id).await.unwrap(), 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_ledger_json_export_roundtrip() {
    let (svc, _store) = memory_service();
    let subject = TestSubject::generate();
    let id = svc.create_identity(&subject.public_pem).await.unwrap();
    let (p1, s1) = subject.signed_payload(id.as_str(), 1, "n1");
    svc.append_signed_event(&id, SignedEvent::Revoke { reason: None }, p1, &s1)
        .await
        .unwrap();

    let chain = svc.read_ledger(&id).await.unwrap();
    let json = serde_json::to_string(&chain).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["event"], "CREATION");
    assert_eq!(value[0]["previousHash"], "GENESIS");
    assert_eq!(value[1]["event"], "STATUS_REVOKED");

    let back: Vec<sigil_core::Block> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, chain);
}
