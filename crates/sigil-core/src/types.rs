use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Scheme prefix shared by every Sigil DID.
pub const DID_PREFIX: &str = "did:sigil:";

/// Decentralized Identifier (DID) derived from a subject's public key.
/// Format: `did:sigil:<base64url-digest>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse a DID from its full URI string.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let Some(identifier) = uri.strip_prefix(DID_PREFIX) else {
            return Err(CoreError::InvalidDid(format!(
                "DID must start with '{}', got: {}",
                DID_PREFIX, uri
            )));
        };
        if identifier.is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "DID has an empty identifier: {}",
                uri
            )));
        }
        if !identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidDid(format!(
                "DID identifier must be base64url without padding, got: {}",
                identifier
            )));
        }
        Ok(Self(uri))
    }

    /// Build a DID from an already-encoded identifier.
    pub fn from_identifier(identifier: &str) -> Self {
        Self(format!("{}{}", DID_PREFIX, identifier))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the identifier (the part after the scheme prefix).
    pub fn identifier(&self) -> &str {
        &self.0[DID_PREFIX.len()..]
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

/// Identifier of a single identity ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerId(String);

impl LedgerId {
    /// Generate a fresh, time-ordered ledger identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LedgerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_new_valid() {
        let did = Did::new("did:sigil:abc_123-XYZ").unwrap();
        assert_eq!(did.uri(), "did:sigil:abc_123-XYZ");
        assert_eq!(did.identifier(), "abc_123-XYZ");
    }

    #[test]
    fn test_did_new_invalid_prefix() {
        assert!(Did::new("did:other:key:abc").is_err());
    }

    #[test]
    fn test_did_new_empty_identifier() {
        assert!(Did::new("did:sigil:").is_err());
    }

    #[test]
    fn test_did_new_rejects_non_base64url() {
        assert!(Did::new("did:sigil:abc+/=").is_err());
    }

    #[test]
    fn test_did_from_identifier() {
        let did = Did::from_identifier("q1w2e3");
        assert_eq!(did.uri(), "did:sigil:q1w2e3");
        assert_eq!(format!("{}", did), "did:sigil:q1w2e3");
    }

    #[test]
    fn test_did_serde_validates() {
        let ok: Did = serde_json::from_str("\"did:sigil:abc\"").unwrap();
        assert_eq!(ok.identifier(), "abc");
        let bad: Result<Did, _> = serde_json::from_str("\"did:other:abc\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_ledger_id_generate_unique() {
        let a = LedgerId::generate();
        let b = LedgerId::generate();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(a.as_str()).is_ok());
    }
}
