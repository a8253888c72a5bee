//! DID derivation from public-key material.
//!
//! `did:sigil:` + base64url-no-pad(BLAKE3(DER SubjectPublicKeyInfo)).
//! The digest covers the binary key encoding, so any textual wrapper of the
//! same key (PEM with different wrapping, hex, base58) yields the same DID.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sigil_core::Did;

use crate::error::CryptoError;
use crate::hashing::hash;
use crate::keys::PublicKey;

/// Derive the DID of a parsed public key.
pub fn did_for_key(public_key: &PublicKey) -> Result<Did, CryptoError> {
    let der = public_key.to_der()?;
    let digest = hash(&der);
    Ok(Did::from_identifier(&URL_SAFE_NO_PAD.encode(digest)))
}

/// Parse textual key material and derive its DID.
pub fn derive_did(public_key: &str) -> Result<Did, CryptoError> {
    let key = PublicKey::parse(public_key)?;
    let did = did_for_key(&key)?;
    tracing::debug!(did = %did, "derived DID from public key");
    Ok(did)
}
