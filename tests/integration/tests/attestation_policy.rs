//! Integration test: attestations, threshold policy and trust levels.

use serde_json::json;
use sigil_core::{AttestationType, TrustLevel};
use sigil_identity::IdentityError;
use sigil_integration_tests::{
    keys, memory_service, sqlite_service, temp_path, TestSubject, AI_KEY, JURY_KEY, SPID_KEY,
    SUSPENSION_KEYS,
};

#[tokio::test]
async fn test_created_identity_can_be_challenged_and_attested() {
    let (svc, _store) = memory_service();
    let subject = TestSubject::generate();

    let id = svc.create_identity(&subject.public_pem).await.unwrap();
    let did = svc.derive_did(&subject.public_pem).unwrap();
    assert!(svc.check_integrity(&id).await.unwrap().valid);

    let grant = svc.issue_challenge(&did).await.unwrap();
    svc.prove_challenge(&did, &grant.nonce, &subject.answer(&grant.nonce))
        .await
        .unwrap();

    svc.attest(&did, AttestationType::AiVerified, json!({}), &keys(&[AI_KEY]))
        .await
        .unwrap();
    let report = svc.verify(&did).await.unwrap();
    assert_eq!(report.status, TrustLevel::AiVerified);
    assert_eq!(report.attestations.len(), 1);
}

#[tokio::test]
async fn test_level_climbs_then_suspension_overrides() {
    let (svc, _store) = memory_service();
    let did = svc
        .register_subject(&TestSubject::generate().public_pem)
        .await
        .unwrap()
        .did;

    assert_eq!(svc.verify(&did).await.unwrap().status, TrustLevel::Unverified);

    svc.attest(&did, AttestationType::AiVerified, json!({"model": "v3"}), &keys(&[AI_KEY]))
        .await
        .unwrap();
    assert_eq!(svc.verify(&did).await.unwrap().status, TrustLevel::AiVerified);

    svc.attest(&did, AttestationType::SpidVerified, json!({}), &keys(&[SPID_KEY]))
        .await
        .unwrap();
    assert_eq!(svc.verify(&did).await.unwrap().status, TrustLevel::StrongVerified);

    svc.attest(&did, AttestationType::JuryVerified, json!({}), &keys(&[JURY_KEY]))
        .await
        .unwrap();
    assert_eq!(svc.verify(&did).await.unwrap().status, TrustLevel::MaxVerified);

    svc.attest(
        &did,
        AttestationType::Suspended,
        json!({"case": 42}),
        &keys(&SUSPENSION_KEYS[..2]),
    )
    .await
    .unwrap();
    let report = svc.verify(&did).await.unwrap();
    assert_eq!(report.status, TrustLevel::Suspended);
    assert_eq!(report.attestations.len(), 4);
}

#[tokio::test]
async fn test_suspension_requires_two_distinct_authorities() {
    let (svc, _store) = memory_service();
    let did = svc
        .register_subject(&TestSubject::generate().public_pem)
        .await
        .unwrap()
        .did;

    for presented in [
        keys(&[SUSPENSION_KEYS[0]]),
        keys(&[SUSPENSION_KEYS[0], SUSPENSION_KEYS[0]]),
        keys(&[SUSPENSION_KEYS[0], AI_KEY]),
    ] {
        assert!(matches!(
            svc.attest(&did, AttestationType::Suspended, json!({}), &presented)
                .await,
            Err(IdentityError::IssuerUnauthorized(_))
        ));
    }
    assert!(svc.verify(&did).await.unwrap().attestations.is_empty());

    svc.attest(
        &did,
        AttestationType::Suspended,
        json!({}),
        &keys(&[SUSPENSION_KEYS[0], SUSPENSION_KEYS[2]]),
    )
    .await
    .unwrap();
    assert_eq!(svc.verify(&did).await.unwrap().status, TrustLevel::Suspended);
}

#[tokio::test]
async fn test_wrong_issuer_for_type() {
    let (svc, _store) = memory_service();
    let did = svc
        .register_subject(&TestSubject::generate().public_pem)
        .await
        .unwrap()
        .did;
    assert!(matches!(
        svc.attest(&did, AttestationType::SpidVerified, json!({}), &keys(&[AI_KEY]))
            .await,
        Err(IdentityError::IssuerUnauthorized(_))
    ));
}

#[tokio::test]
async fn test_revocation_restores_lower_level() {
    let (svc, _store) = memory_service();
    let did = svc
        .register_subject(&TestSubject::generate().public_pem)
        .await
        .unwrap()
        .did;
    svc.attest(&did, AttestationType::AiVerified, json!({}), &keys(&[AI_KEY]))
        .await
        .unwrap();
    let spid = svc
        .attest(&did, AttestationType::SpidVerified, json!({}), &keys(&[SPID_KEY]))
        .await
        .unwrap();
    assert_eq!(svc.verify(&did).await.unwrap().status, TrustLevel::StrongVerified);

    svc.revoke_attestation(&did, &spid.id, &keys(&[SPID_KEY]))
        .await
        .unwrap();
    let report = svc.verify(&did).await.unwrap();
    assert_eq!(report.status, TrustLevel::AiVerified);
    // Revoked records stay in the history.
    assert_eq!(report.attestations.len(), 2);
    assert!(report.attestations[1].revoked);
}

#[tokio::test]
async fn test_attestations_persist_on_sqlite() {
    let dir = temp_path("attestation-policy");
    let db = dir.join("sigil.db");
    let pem = TestSubject::generate().public_pem;

    let did = {
        let svc = sqlite_service(&db);
        let did = svc.register_subject(&pem).await.unwrap().did;
        svc.attest(&did, AttestationType::AiVerified, json!({"score": 0.98}), &keys(&[AI_KEY]))
            .await
            .unwrap();
        svc.attest(&did, AttestationType::SpidVerified, json!({}), &keys(&[SPID_KEY]))
            .await
            .unwrap();
        did
    };

    let svc = sqlite_service(&db);
    let report = svc.verify(&did).await.unwrap();
    assert_eq!(report.status, TrustLevel::StrongVerified);
    assert_eq!(report.attestations[0].payload["score"], 0.98);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_verify_unknown_subject() {
    let (svc, _store) = memory_service();
    let did = sigil_core::Did::from_identifier("nobody");
    assert!(matches!(svc.verify(&did).await, Err(IdentityError::NotFound(_))));
}
