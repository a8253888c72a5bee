//! Sigil Core: Fundamental types, canonical encodings, and errors for the
//! Sigil identity ledger.

pub mod block;
pub mod canonical;
pub mod config;
pub mod error;
pub mod records;
pub mod types;

pub use block::{
    Block, EventKind, GenesisData, IdentityStatus, LedgerEvent, StatusChangeData,
    VerificationData, GENESIS_PREVIOUS_HASH,
};
pub use canonical::{canonical_message, SignablePayload};
pub use config::{ChallengeConfig, PolicyConfig};
pub use error::CoreError;
pub use records::{AnchorRecord, Attestation, AttestationType, Challenge, Subject, TrustLevel};
pub use types::{Did, LedgerId};
