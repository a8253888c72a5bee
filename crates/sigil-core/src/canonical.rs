//! Canonical message encoding for signed ledger events.
//!
//! The string produced here, not the structured payload, is what a subject
//! signs. Field order and separators are fixed:
//!
//! ```text
//! id=<id>|level=<level>|ts=<ts>|nonce=<nonce>
//! ```
//!
//! Separator characters inside field values are not escaped.

use serde::{Deserialize, Serialize};

/// A signable state-change request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignablePayload {
    /// Ledger id the request targets.
    pub id: String,
    /// Requested verification level.
    pub level: u32,
    /// Client timestamp (unix milliseconds).
    pub ts: i64,
    /// Client-chosen nonce, unique per ledger.
    pub nonce: String,
}

impl SignablePayload {
    pub fn new(id: impl Into<String>, level: u32, ts: i64, nonce: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level,
            ts,
            nonce: nonce.into(),
        }
    }

    /// The canonical message covered by the signature.
    pub fn canonical_message(&self) -> String {
        canonical_message(self)
    }
}

/// Encode a payload as its canonical signing string.
pub fn canonical_message(payload: &SignablePayload) -> String {
    format!(
        "id={}|level={}|ts={}|nonce={}",
        payload.id, payload.level, payload.ts, payload.nonce
    )
}
