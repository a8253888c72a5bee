//! Facade over the identity engine, the surface a CLI or HTTP layer binds to.

use std::sync::Arc;

use sigil_core::{
    Attestation, AttestationType, Block, ChallengeConfig, Did, LedgerId, PolicyConfig,
    SignablePayload, Subject,
};
use sigil_store::IdentityStore;

use crate::attestation::{AttestationService, VerificationReport};
use crate::challenge::{ChallengeAuthenticator, ChallengeGrant};
use crate::error::IdentityError;
use crate::ledger::{IdentityLedger, IntegrityReport, SignedEvent};
use crate::policy::IssuerPolicy;
use crate::registry::SubjectRegistry;

pub struct IdentityService {
    registry: SubjectRegistry,
    ledger: IdentityLedger,
    challenges: ChallengeAuthenticator,
    attestations: AttestationService,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        challenge: &ChallengeConfig,
        policy: IssuerPolicy,
    ) -> Self {
        Self {
            registry: SubjectRegistry::new(store.clone()),
            ledger: IdentityLedger::new(store.clone()),
            challenges: ChallengeAuthenticator::new(store.clone(), challenge),
            attestations: AttestationService::new(store, policy),
        }
    }

    /// Build from configuration sections, validating the issuer policy.
    pub fn from_config(
        store: Arc<dyn IdentityStore>,
        challenge: &ChallengeConfig,
        policy: &PolicyConfig,
    ) -> Result<Self, IdentityError> {
        Ok(Self::new(store, challenge, IssuerPolicy::from_config(policy)?))
    }

    pub fn attestations(&self) -> &AttestationService {
        &self.attestations
    }

    /// Register `public_key` under its DID, then open a ledger governed by
    /// it. The subject is immediately usable for challenges and attestations.
    pub async fn create_identity(&self, public_key: &str) -> Result<LedgerId, IdentityError> {
        let subject = self.registry.register(public_key).await?;
        let id = self.ledger.create(&subject.public_key).await?;
        tracing::debug!(id = %id, did = %subject.did, "identity bound to subject");
        Ok(id)
    }

    pub async fn append_signed_event(
        &self,
        id: &LedgerId,
        event: SignedEvent,
        payload: SignablePayload,
        signature: &str,
    ) -> Result<Block, IdentityError> {
        self.ledger.append(id, event, payload, signature).await
    }

    pub async fn check_integrity(&self, id: &LedgerId) -> Result<IntegrityReport, IdentityError> {
        self.ledger.integrity_check(id).await
    }

    pub async fn read_ledger(&self, id: &LedgerId) -> Result<Vec<Block>, IdentityError> {
        self.ledger.read(id).await
    }

    /// Full audit of one ledger; returns the number of blocks verified.
    pub async fn verify_chain(&self, id: &LedgerId) -> Result<usize, IdentityError> {
        self.ledger.verify_chain(id).await
    }

    pub fn derive_did(&self, public_key: &str) -> Result<Did, IdentityError> {
        Ok(sigil_crypto::derive_did(public_key)?)
    }

    pub async fn register_subject(&self, public_key: &str) -> Result<Subject, IdentityError> {
        self.registry.register(public_key).await
    }

    pub async fn get_subject(&self, did: &Did) -> Result<Subject, IdentityError> {
        self.registry.get(did).await
    }

    pub async fn issue_challenge(&self, did: &Did) -> Result<ChallengeGrant, IdentityError> {
        self.challenges.issue(did).await
    }

    pub async fn prove_challenge(
        &self,
        did: &Did,
        nonce: &str,
        signature: &str,
    ) -> Result<(), IdentityError> {
        self.challenges.prove(did, nonce, signature).await
    }

    pub async fn attest(
        &self,
        did: &Did,
        attestation_type: AttestationType,
        payload: serde_json::Value,
        issuer_keys: &[String],
    ) -> Result<Attestation, IdentityError> {
        self.attestations
            .attest(did, attestation_type, payload, issuer_keys)
            .await
    }

    pub async fn revoke_attestation(
        &self,
        did: &Did,
        attestation_id: &str,
        issuer_keys: &[String],
    ) -> Result<Attestation, IdentityError> {
        self.attestations
            .revoke(did, attestation_id, issuer_keys)
            .await
    }

    pub async fn verify(&self, did: &Did) -> Result<VerificationReport, IdentityError> {
        self.attestations.verify(did).await
    }
}
