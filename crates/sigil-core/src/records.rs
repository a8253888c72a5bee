use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{Did, LedgerId};

/// A registered subject: a DID bound to one immutable public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub did: Did,
    /// Governing public key (canonical PEM).
    pub public_key: String,
    pub created_at: DateTime<Utc>,
}

/// Latest committed block hash of one ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    pub id: LedgerId,
    pub timestamp: DateTime<Utc>,
    pub latest_hash: String,
}

impl AnchorRecord {
    pub fn new(id: LedgerId, latest_hash: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            latest_hash: latest_hash.into(),
        }
    }
}

/// An outstanding proof-of-possession challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub did: Did,
    pub nonce: String,
    pub expiry: DateTime<Utc>,
}

impl Challenge {
    /// Whether the challenge has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }
}

/// Kinds of issuer claims about a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttestationType {
    AiVerified,
    SpidVerified,
    JuryVerified,
    Suspended,
}

impl AttestationType {
    pub const ALL: [AttestationType; 4] = [
        Self::AiVerified,
        Self::SpidVerified,
        Self::JuryVerified,
        Self::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiVerified => "AI_VERIFIED",
            Self::SpidVerified => "SPID_VERIFIED",
            Self::JuryVerified => "JURY_VERIFIED",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for AttestationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttestationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAttestationType(s.to_string()))
    }
}

/// An issuer claim recorded against a DID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub id: String,
    #[serde(rename = "type")]
    pub attestation_type: AttestationType,
    pub payload: serde_json::Value,
    pub issued_at: DateTime<Utc>,
    pub revoked: bool,
}

impl Attestation {
    /// Create a fresh, non-revoked attestation.
    pub fn new(attestation_type: AttestationType, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            attestation_type,
            payload,
            issued_at: Utc::now(),
            revoked: false,
        }
    }
}

/// Trust level derived from a subject's attestations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrustLevel {
    Unverified,
    AiVerified,
    StrongVerified,
    MaxVerified,
    Suspended,
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified => write!(f, "UNVERIFIED"),
            Self::AiVerified => write!(f, "AI_VERIFIED"),
            Self::StrongVerified => write!(f, "STRONG_VERIFIED"),
            Self::MaxVerified => write!(f, "MAX_VERIFIED"),
            Self::Suspended => write!(f, "SUSPENDED"),
        }
    }
}
