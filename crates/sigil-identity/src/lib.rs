//! Sigil Identity: the integrity and trust-policy engine over hash-chained
//! identity ledgers with anchored heads, challenge-response proof of key
//! possession, and issuer-authorized attestations with threshold policy.

pub mod anchor;
pub mod attestation;
pub mod challenge;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod policy;
pub mod registry;
pub mod service;

pub use anchor::AnchorIndex;
pub use attestation::{derive_trust_level, AttestationService, VerificationReport};
pub use challenge::{ChallengeAuthenticator, ChallengeGrant};
pub use error::IdentityError;
pub use ledger::{IdentityLedger, IdentityState, IntegrityReport, SignedEvent};
pub use locks::{SubjectGuard, SubjectLocks};
pub use policy::{IssuerPolicy, ThresholdRule};
pub use registry::SubjectRegistry;
pub use service::IdentityService;
