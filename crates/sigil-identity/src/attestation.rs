use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sigil_core::{Attestation, AttestationType, Did, TrustLevel};
use sigil_store::IdentityStore;

use crate::error::IdentityError;
use crate::policy::IssuerPolicy;
use crate::registry::SubjectRegistry;

/// A subject's derived trust level together with its attestation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub did: Did,
    pub status: TrustLevel,
    pub attestations: Vec<Attestation>,
}

/// Derive a trust level from attestations. Revoked entries are ignored.
///
/// Precedence: any SUSPENDED wins; then AI+SPID+JURY, AI+SPID, AI alone.
pub fn derive_trust_level(attestations: &[Attestation]) -> TrustLevel {
    let has = |t: AttestationType| {
        attestations
            .iter()
            .any(|a| !a.revoked && a.attestation_type == t)
    };

    let ai = has(AttestationType::AiVerified);
    let spid = has(AttestationType::SpidVerified);
    let jury = has(AttestationType::JuryVerified);

    if has(AttestationType::Suspended) {
        TrustLevel::Suspended
    } else if ai && spid && jury {
        TrustLevel::MaxVerified
    } else if ai && spid {
        TrustLevel::StrongVerified
    } else if ai {
        TrustLevel::AiVerified
    } else {
        TrustLevel::Unverified
    }
}

/// Issuer-authorized claims per DID.
pub struct AttestationService {
    store: Arc<dyn IdentityStore>,
    registry: SubjectRegistry,
    policy: IssuerPolicy,
}

impl AttestationService {
    pub fn new(store: Arc<dyn IdentityStore>, policy: IssuerPolicy) -> Self {
        Self {
            registry: SubjectRegistry::new(store.clone()),
            store,
            policy,
        }
    }

    /// Record a new attestation if `issuer_keys` satisfy the rule for its type.
    pub async fn attest(
        &self,
        did: &Did,
        attestation_type: AttestationType,
        payload: serde_json::Value,
        issuer_keys: &[String],
    ) -> Result<Attestation, IdentityError> {
        self.registry.get(did).await?;
        self.policy.authorize(attestation_type, issuer_keys)?;

        let attestation = Attestation::new(attestation_type, payload);
        self.store.append_attestation(did, &attestation).await?;

        tracing::info!(
            did = %did,
            attestation_type = %attestation_type,
            attestation_id = %attestation.id,
            "attestation issued"
        );
        Ok(attestation)
    }

    /// Revoke an attestation. The keys must satisfy the same rule that
    /// governs issuing an attestation of that type. Revoking twice is a no-op.
    pub async fn revoke(
        &self,
        did: &Did,
        attestation_id: &str,
        issuer_keys: &[String],
    ) -> Result<Attestation, IdentityError> {
        let mut attestation = self
            .store
            .list_attestations(did)
            .await?
            .into_iter()
            .find(|a| a.id == attestation_id)
            .ok_or_else(|| {
                IdentityError::NotFound(format!("attestation {} for {}", attestation_id, did))
            })?;

        self.policy
            .authorize(attestation.attestation_type, issuer_keys)?;

        if attestation.revoked {
            return Ok(attestation);
        }
        if !self.store.set_attestation_revoked(did, attestation_id).await? {
            return Err(IdentityError::NotFound(format!(
                "attestation {} for {}",
                attestation_id, did
            )));
        }
        attestation.revoked = true;

        tracing::info!(did = %did, attestation_id = %attestation_id, "attestation revoked");
        Ok(attestation)
    }

    pub async fn derive_level(&self, did: &Did) -> Result<TrustLevel, IdentityError> {
        Ok(derive_trust_level(&self.store.list_attestations(did).await?))
    }

    /// Trust level and full history for a registered subject.
    pub async fn verify(&self, did: &Did) -> Result<VerificationReport, IdentityError> {
        self.registry.get(did).await?;
        let attestations = self.store.list_attestations(did).await?;
        Ok(VerificationReport {
            did: did.clone(),
            status: derive_trust_level(&attestations),
            attestations,
        })
    }
}
