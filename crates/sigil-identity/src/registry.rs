use std::sync::Arc;

use chrono::Utc;
use sigil_core::{Did, Subject};
use sigil_crypto::{did_for_key, PublicKey};
use sigil_store::IdentityStore;

use crate::error::IdentityError;

/// Subject registration and lookup by DID.
#[derive(Clone)]
pub struct SubjectRegistry {
    store: Arc<dyn IdentityStore>,
}

impl SubjectRegistry {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Register a public key under its derived DID.
    ///
    /// Idempotent: registering the same key material again, in any textual
    /// encoding, returns the record created the first time.
    pub async fn register(&self, public_key: &str) -> Result<Subject, IdentityError> {
        let key = PublicKey::parse(public_key)?;
        let did = did_for_key(&key)?;
        let subject = Subject {
            did: did.clone(),
            public_key: key.to_pem()?,
            created_at: Utc::now(),
        };

        if self.store.create_subject(&subject).await? {
            tracing::info!(did = %did, "subject registered");
            return Ok(subject);
        }
        tracing::debug!(did = %did, "subject already registered");
        self.get(&did).await
    }

    /// Look up a registered subject.
    pub async fn get(&self, did: &Did) -> Result<Subject, IdentityError> {
        self.store
            .get_subject(did)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("subject {}", did)))
    }

    /// The subject's governing public key.
    pub async fn public_key(&self, did: &Did) -> Result<PublicKey, IdentityError> {
        let subject = self.get(did).await?;
        Ok(PublicKey::parse(&subject.public_key)?)
    }
}
