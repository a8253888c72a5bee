//! Integration test: challenge-response proof of possession.

use chrono::{Duration, Utc};
use sigil_core::ChallengeConfig;
use sigil_identity::{ChallengeAuthenticator, IdentityError};
use sigil_integration_tests::{memory_service, TestSubject};

#[tokio::test]
async fn test_register_challenge_prove() {
    let (svc, _store) = memory_service();
    let subject = TestSubject::generate();
    let record = svc.register_subject(&subject.public_pem).await.unwrap();

    let grant = svc.issue_challenge(&record.did).await.unwrap();
    svc.prove_challenge(&record.did, &grant.nonce, &subject.answer(&grant.nonce))
        .await
        .unwrap();

    // Single use.
    assert!(matches!(
        svc.prove_challenge(&record.did, &grant.nonce, &subject.answer(&grant.nonce))
            .await,
        Err(IdentityError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_mismatch_then_success_then_replay() {
    let (svc, _store) = memory_service();
    let subject = TestSubject::generate();
    let did = svc.register_subject(&subject.public_pem).await.unwrap().did;
    let grant = svc.issue_challenge(&did).await.unwrap();

    assert!(matches!(
        svc.prove_challenge(&did, "stale-nonce", &subject.answer("stale-nonce"))
            .await,
        Err(IdentityError::ChallengeMismatch)
    ));
    svc.prove_challenge(&did, &grant.nonce, &subject.answer(&grant.nonce))
        .await
        .unwrap();
    assert!(svc
        .prove_challenge(&did, &grant.nonce, &subject.answer(&grant.nonce))
        .await
        .is_err());
}

#[tokio::test]
async fn test_expired_challenge_fails_even_with_valid_signature() {
    let (svc, store) = memory_service();
    let subject = TestSubject::generate();
    let did = svc.register_subject(&subject.public_pem).await.unwrap().did;

    // Issued two minutes ago against the same store.
    let issuer = ChallengeAuthenticator::new(store, &ChallengeConfig::default());
    let issued_at = Utc::now() - Duration::seconds(120);
    let grant = issuer.issue_at(&did, issued_at).await.unwrap();
    let err = svc
        .prove_challenge(&did, &grant.nonce, &subject.answer(&grant.nonce))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::ChallengeExpired));
}

#[tokio::test]
async fn test_other_key_cannot_answer() {
    let (svc, _store) = memory_service();
    let subject = TestSubject::generate();
    let impostor = TestSubject::generate();
    let did = svc.register_subject(&subject.public_pem).await.unwrap().did;

    let grant = svc.issue_challenge(&did).await.unwrap();
    assert!(matches!(
        svc.prove_challenge(&did, &grant.nonce, &impostor.answer(&grant.nonce))
            .await,
        Err(IdentityError::SignatureInvalid)
    ));
}

#[tokio::test]
async fn test_did_stable_across_key_formatting() {
    let (svc, _store) = memory_service();
    let subject = TestSubject::generate();
    let reformatted = subject.public_pem.replace('\n', "\r\n    ");

    let a = svc.derive_did(&subject.public_pem).unwrap();
    let b = svc.derive_did(&reformatted).unwrap();
    assert_eq!(a, b);

    let first = svc.register_subject(&subject.public_pem).await.unwrap();
    let second = svc.register_subject(&reformatted).await.unwrap();
    assert_eq!(first.did, a);
    assert_eq!(first, second);
}
