//! Fixtures shared by the cross-crate scenarios in `tests/`.

use std::path::PathBuf;
use std::sync::Arc;

use sigil_core::{ChallengeConfig, PolicyConfig, SignablePayload};
use sigil_crypto::{sign, KeyPair};
use sigil_identity::IdentityService;
use sigil_store::{IdentityStore, MemoryStore, SqliteStore};

pub const AI_KEY: &str = "ai-issuer-secret";
pub const SPID_KEY: &str = "spid-issuer-secret";
pub const JURY_KEY: &str = "jury-issuer-secret";
pub const SUSPENSION_KEYS: [&str; 3] = ["authority-1", "authority-2", "authority-3"];

/// A subject's key pair with its public key in PEM form.
pub struct TestSubject {
    pub keypair: KeyPair,
    pub public_pem: String,
}

impl TestSubject {
    pub fn generate() -> Self {
        let keypair = KeyPair::generate();
        let public_pem = keypair
            .public_key()
            .to_pem()
            .expect("PEM encoding of a fresh key");
        Self {
            keypair,
            public_pem,
        }
    }

    /// Build and sign a payload for `ledger_id`.
    pub fn signed_payload(
        &self,
        ledger_id: &str,
        level: u32,
        nonce: &str,
    ) -> (SignablePayload, String) {
        let payload = SignablePayload::new(
            ledger_id,
            level,
            chrono::Utc::now().timestamp_millis(),
            nonce,
        );
        let signature = sign(payload.canonical_message().as_bytes(), &self.keypair).to_base64();
        (payload, signature)
    }

    /// Sign a challenge nonce.
    pub fn answer(&self, nonce: &str) -> String {
        sign(nonce.as_bytes(), &self.keypair).to_base64()
    }
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Policy with one issuer per single-issuer type and 2-of-3 suspension.
pub fn test_policy() -> PolicyConfig {
    PolicyConfig {
        ai_issuer_keys: keys(&[AI_KEY]),
        spid_issuer_keys: keys(&[SPID_KEY]),
        jury_issuer_keys: keys(&[JURY_KEY]),
        suspension_keys: keys(&SUSPENSION_KEYS),
        suspension_threshold: 2,
    }
}

pub fn service_on(store: Arc<dyn IdentityStore>) -> IdentityService {
    IdentityService::from_config(store, &ChallengeConfig::default(), &test_policy())
        .expect("test policy is valid")
}

pub fn memory_service() -> (IdentityService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (service_on(store.clone()), store)
}

pub fn sqlite_service(path: &std::path::Path) -> IdentityService {
    service_on(Arc::new(SqliteStore::open(path).expect("open sqlite store")))
}

/// A unique scratch path under the system temp dir.
pub fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sigil-{}-{}", tag, rand::random::<u64>()))
}
