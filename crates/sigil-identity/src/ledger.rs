//! Per-subject hash-chained identity ledger.
//!
//! The genesis block embeds the governing public key. Every later block
//! carries a payload signed with that key over its canonical message, and
//! links to its predecessor by hash. After each committed block the anchor
//! index is moved to the new head.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sigil_core::{
    Block, EventKind, IdentityStatus, LedgerEvent, LedgerId, SignablePayload, StatusChangeData,
    VerificationData, GENESIS_PREVIOUS_HASH,
};
use sigil_crypto::{verify, PublicKey, Signature};
use sigil_store::IdentityStore;

use crate::anchor::AnchorIndex;
use crate::error::IdentityError;
use crate::locks::SubjectLocks;

/// A state change a subject may append to its own ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedEvent {
    /// Sets the verification level to `payload.level`.
    UpdateVerification,
    Suspend { reason: Option<String> },
    Revoke { reason: Option<String> },
}

impl SignedEvent {
    /// Map an event tag to an appendable event. `CREATION` is only ever
    /// written by [`IdentityLedger::create`].
    pub fn from_kind(kind: EventKind, reason: Option<String>) -> Result<Self, IdentityError> {
        match kind {
            EventKind::UpdateVerification => Ok(Self::UpdateVerification),
            EventKind::StatusSuspended => Ok(Self::Suspend { reason }),
            EventKind::StatusRevoked => Ok(Self::Revoke { reason }),
            EventKind::Creation => Err(IdentityError::ValidationError(
                "CREATION events cannot be appended".into(),
            )),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::UpdateVerification => EventKind::UpdateVerification,
            Self::Suspend { .. } => EventKind::StatusSuspended,
            Self::Revoke { .. } => EventKind::StatusRevoked,
        }
    }

    fn into_ledger_event(self, payload: SignablePayload, signature: String) -> LedgerEvent {
        match self {
            Self::UpdateVerification => {
                LedgerEvent::UpdateVerification(VerificationData { payload, signature })
            }
            Self::Suspend { reason } => LedgerEvent::StatusSuspended(StatusChangeData {
                payload,
                signature,
                reason,
            }),
            Self::Revoke { reason } => LedgerEvent::StatusRevoked(StatusChangeData {
                payload,
                signature,
                reason,
            }),
        }
    }
}

impl FromStr for SignedEvent {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_kind(s.parse()?, None)
    }
}

/// Status and verification level derived from a full chain scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityState {
    pub status: IdentityStatus,
    pub verification_level: u32,
}

impl IdentityState {
    /// Fold a chain in order. Genesis supplies the initial values; later
    /// events overwrite the field they govern. Nothing reverts a status.
    pub fn from_chain(blocks: &[Block]) -> Self {
        let mut state = Self {
            status: IdentityStatus::Active,
            verification_level: 0,
        };
        for block in blocks {
            match &block.event {
                LedgerEvent::Creation(g) => {
                    state.status = g.status;
                    state.verification_level = g.verification_level;
                }
                LedgerEvent::UpdateVerification(d) => state.verification_level = d.payload.level,
                LedgerEvent::StatusSuspended(_) => state.status = IdentityStatus::Suspended,
                LedgerEvent::StatusRevoked(_) => state.status = IdentityStatus::Revoked,
            }
        }
        state
    }
}

/// Result of comparing a ledger head against its anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub valid: bool,
    pub status: IdentityStatus,
    pub verification_level: u32,
    pub block_count: usize,
    /// Hash recomputed from the last stored block.
    pub computed_hash: String,
    /// Hash recorded in the anchor index.
    pub anchored_hash: String,
}

/// The identity ledger engine.
pub struct IdentityLedger {
    store: Arc<dyn IdentityStore>,
    anchors: AnchorIndex,
    locks: SubjectLocks,
}

impl IdentityLedger {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self {
            anchors: AnchorIndex::new(store.clone()),
            store,
            locks: SubjectLocks::new(),
        }
    }

    /// Open a new ledger governed by `public_key`. Returns its fresh id.
    pub async fn create(&self, public_key: &str) -> Result<LedgerId, IdentityError> {
        let key = PublicKey::parse(public_key)?;
        let id = LedgerId::generate();
        let genesis = Block::genesis(key.to_pem()?, Utc::now().timestamp_millis())?;

        self.store.create_ledger(&id, &genesis).await?;
        self.anchors.upsert(&id, &genesis.hash).await?;

        tracing::info!(id = %id, hash = %genesis.hash, "identity ledger created");
        Ok(id)
    }

    /// Append a signed event. On any validation failure the ledger and its
    /// anchor are left untouched.
    pub async fn append(
        &self,
        id: &LedgerId,
        event: SignedEvent,
        payload: SignablePayload,
        signature: &str,
    ) -> Result<Block, IdentityError> {
        let _guard = self.locks.acquire(id.as_str()).await;

        let ledger = self.read(id).await?;
        let key = governing_key(&ledger)?;

        if payload.id != id.as_str() {
            tracing::warn!(id = %id, payload_id = %payload.id, "append rejected: id mismatch");
            return Err(IdentityError::ValidationError(format!(
                "payload id '{}' does not match ledger '{}'",
                payload.id, id
            )));
        }

        let sig = Signature::decode(signature)?;
        if let Err(e) = verify(payload.canonical_message().as_bytes(), &sig, &key) {
            tracing::warn!(id = %id, event = %event.kind(), "append rejected: bad signature");
            return Err(e.into());
        }

        let replayed = ledger
            .iter()
            .filter_map(|b| b.event.signed_payload())
            .any(|p| p.nonce == payload.nonce);
        if replayed {
            tracing::warn!(id = %id, nonce = %payload.nonce, "append rejected: nonce reused");
            return Err(IdentityError::ValidationError(format!(
                "nonce '{}' already used on this ledger",
                payload.nonce
            )));
        }

        let last = ledger
            .last()
            .ok_or_else(|| IdentityError::NotFound(format!("ledger {}", id)))?;
        let kind = event.kind();
        let block = Block::seal(
            last.index + 1,
            Utc::now().timestamp_millis(),
            event.into_ledger_event(payload, signature.trim().to_string()),
            last.hash.clone(),
        )?;

        self.store.append_block(id, &block).await?;
        self.anchors.upsert(id, &block.hash).await?;

        tracing::info!(id = %id, index = block.index, event = %kind, "block appended");
        Ok(block)
    }

    /// Compare the recomputed hash of the head block with the anchor and
    /// derive the current status and level.
    pub async fn integrity_check(&self, id: &LedgerId) -> Result<IntegrityReport, IdentityError> {
        let ledger = self.read(id).await?;
        let anchor = self.anchors.get(id).await?;
        let last = ledger
            .last()
            .ok_or_else(|| IdentityError::NotFound(format!("ledger {}", id)))?;

        let computed_hash = last.compute_hash()?;
        let valid = computed_hash == anchor.latest_hash;
        if !valid {
            tracing::warn!(id = %id, "ledger head diverges from anchor");
        }

        let state = IdentityState::from_chain(&ledger);
        Ok(IntegrityReport {
            valid,
            status: state.status,
            verification_level: state.verification_level,
            block_count: ledger.len(),
            computed_hash,
            anchored_hash: anchor.latest_hash,
        })
    }

    /// The full ledger, for export and debugging.
    pub async fn read(&self, id: &LedgerId) -> Result<Vec<Block>, IdentityError> {
        self.store
            .get_ledger(id)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("ledger {}", id)))
    }

    /// Audit every block: position, genesis sentinel, hash linkage and each
    /// stored hash, then the anchor. Returns the number of blocks checked.
    pub async fn verify_chain(&self, id: &LedgerId) -> Result<usize, IdentityError> {
        let ledger = self.read(id).await?;
        let mismatch = |index: u64, reason: String| IdentityError::IntegrityMismatch { index, reason };

        for (pos, block) in ledger.iter().enumerate() {
            let pos = pos as u64;
            if block.index != pos {
                return Err(mismatch(pos, format!("stored index {}", block.index)));
            }
            if pos == 0 {
                if block.previous_hash != GENESIS_PREVIOUS_HASH
                    || block.kind() != EventKind::Creation
                {
                    return Err(mismatch(0, "malformed genesis block".into()));
                }
            } else {
                let prev = &ledger[pos as usize - 1];
                if block.previous_hash != prev.hash {
                    return Err(mismatch(pos, "previousHash does not link to prior block".into()));
                }
                if block.kind() == EventKind::Creation {
                    return Err(mismatch(pos, "CREATION event after genesis".into()));
                }
            }
            if block.compute_hash()? != block.hash {
                return Err(mismatch(pos, "stored hash does not match contents".into()));
            }
        }

        let anchor = self.anchors.get(id).await?;
        if let Some(last) = ledger.last() {
            if anchor.latest_hash != last.hash {
                return Err(mismatch(last.index, "anchor does not match ledger head".into()));
            }
        }

        tracing::debug!(id = %id, blocks = ledger.len(), "chain verified");
        Ok(ledger.len())
    }
}

/// The public key embedded in the genesis block.
fn governing_key(ledger: &[Block]) -> Result<PublicKey, IdentityError> {
    match ledger.first().map(|b| &b.event) {
        Some(LedgerEvent::Creation(genesis)) => Ok(PublicKey::parse(&genesis.public_key)?),
        _ => Err(IdentityError::IntegrityMismatch {
            index: 0,
            reason: "ledger does not start with a CREATION block".into(),
        }),
    }
}
