//! Challenge-response proof of key possession.
//!
//! Per DID: `NONE -> ISSUED(nonce, expiry) -> {CONSUMED, EXPIRED}`. A nonce
//! mismatch leaves the challenge in place so the legitimate holder can
//! still answer before expiry. Any attempt that reaches signature checking
//! consumes it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sigil_core::{Challenge, ChallengeConfig, Did};
use sigil_crypto::{digests_match, random_nonce, verify, Signature};
use sigil_store::IdentityStore;

use crate::error::IdentityError;
use crate::locks::SubjectLocks;
use crate::registry::SubjectRegistry;

/// What the subject receives: the nonce to sign and its deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeGrant {
    pub nonce: String,
    pub expiry: DateTime<Utc>,
}

pub struct ChallengeAuthenticator {
    store: Arc<dyn IdentityStore>,
    registry: SubjectRegistry,
    locks: SubjectLocks,
    ttl: Duration,
}

impl ChallengeAuthenticator {
    pub fn new(store: Arc<dyn IdentityStore>, config: &ChallengeConfig) -> Self {
        Self {
            registry: SubjectRegistry::new(store.clone()),
            store,
            locks: SubjectLocks::new(),
            ttl: Duration::seconds(config.ttl_secs.min(u32::MAX as u64) as i64),
        }
    }

    pub async fn issue(&self, did: &Did) -> Result<ChallengeGrant, IdentityError> {
        self.issue_at(did, Utc::now()).await
    }

    /// Issue a fresh challenge relative to `now`, replacing any pending one.
    pub async fn issue_at(
        &self,
        did: &Did,
        now: DateTime<Utc>,
    ) -> Result<ChallengeGrant, IdentityError> {
        let _guard = self.locks.acquire(did.uri()).await;
        self.registry.get(did).await?;

        let challenge = Challenge {
            did: did.clone(),
            nonce: random_nonce(),
            expiry: now + self.ttl,
        };
        self.store.set_challenge(&challenge).await?;

        tracing::info!(did = %did, expiry = %challenge.expiry, "challenge issued");
        Ok(ChallengeGrant {
            nonce: challenge.nonce,
            expiry: challenge.expiry,
        })
    }

    pub async fn prove(&self, did: &Did, nonce: &str, signature: &str) -> Result<(), IdentityError> {
        self.prove_at(did, nonce, signature, Utc::now()).await
    }

    /// Answer the pending challenge as of `now`. The signature covers the
    /// UTF-8 bytes of the nonce exactly as issued.
    pub async fn prove_at(
        &self,
        did: &Did,
        nonce: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), IdentityError> {
        let _guard = self.locks.acquire(did.uri()).await;

        let challenge = self
            .store
            .get_challenge(did)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("challenge for {}", did)))?;

        if challenge.is_expired_at(now) {
            self.store.delete_challenge(did).await?;
            tracing::warn!(did = %did, "challenge expired");
            return Err(IdentityError::ChallengeExpired);
        }

        if !digests_match(challenge.nonce.as_bytes(), nonce.as_bytes()) {
            tracing::warn!(did = %did, "challenge nonce mismatch");
            return Err(IdentityError::ChallengeMismatch);
        }

        // Single use from here on, whatever the outcome.
        self.store.delete_challenge(did).await?;

        let key = self.registry.public_key(did).await?;
        let sig = Signature::decode(signature)?;
        verify(challenge.nonce.as_bytes(), &sig, &key)?;

        tracing::info!(did = %did, "challenge proven");
        Ok(())
    }
}
