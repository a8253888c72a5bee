//! Ledger blocks and their canonical serialization.
//!
//! A block's hash is `hex(BLAKE3(canonical_bytes))` where `canonical_bytes`
//! is a compact JSON object whose keys appear in this fixed order:
//!
//! 1. `index`
//! 2. `timestamp`
//! 3. `event`
//! 4. `data` (keys ordered per event, see the `*Data` structs)
//! 5. `previousHash`
//!
//! The order comes from the declaration order of the serialization structs
//! in this module and never from map iteration, so any implementation that
//! emits the same keys in the same order hashes identically.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::canonical::SignablePayload;
use crate::error::CoreError;

/// `previousHash` of every genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "GENESIS";

/// Event tag carried by each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Creation,
    UpdateVerification,
    StatusSuspended,
    StatusRevoked,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creation => "CREATION",
            Self::UpdateVerification => "UPDATE_VERIFICATION",
            Self::StatusSuspended => "STATUS_SUSPENDED",
            Self::StatusRevoked => "STATUS_REVOKED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATION" => Ok(Self::Creation),
            "UPDATE_VERIFICATION" => Ok(Self::UpdateVerification),
            "STATUS_SUSPENDED" => Ok(Self::StatusSuspended),
            "STATUS_REVOKED" => Ok(Self::StatusRevoked),
            other => Err(CoreError::UnknownEvent(other.to_string())),
        }
    }
}

/// Lifecycle status of an identity as recorded in its ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityStatus {
    Active,
    Suspended,
    Revoked,
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Suspended => write!(f, "SUSPENDED"),
            Self::Revoked => write!(f, "REVOKED"),
        }
    }
}

/// Data of the genesis block. Key order: `publicKey`, `status`,
/// `verificationLevel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenesisData {
    /// Governing public key (canonical PEM).
    pub public_key: String,
    /// Initial status.
    pub status: IdentityStatus,
    /// Initial verification level.
    pub verification_level: u32,
}

/// Data of an `UPDATE_VERIFICATION` block. Key order: `payload`, `signature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerificationData {
    pub payload: SignablePayload,
    pub signature: String,
}

/// Data of a `STATUS_SUSPENDED` or `STATUS_REVOKED` block. Key order:
/// `payload`, `signature`, `reason` (omitted when absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusChangeData {
    pub payload: SignablePayload,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A ledger event together with its typed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Creation(GenesisData),
    UpdateVerification(VerificationData),
    StatusSuspended(StatusChangeData),
    StatusRevoked(StatusChangeData),
}

impl LedgerEvent {
    /// The event tag.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Creation(_) => EventKind::Creation,
            Self::UpdateVerification(_) => EventKind::UpdateVerification,
            Self::StatusSuspended(_) => EventKind::StatusSuspended,
            Self::StatusRevoked(_) => EventKind::StatusRevoked,
        }
    }

    /// The signed payload, for every event except genesis.
    pub fn signed_payload(&self) -> Option<&SignablePayload> {
        match self {
            Self::Creation(_) => None,
            Self::UpdateVerification(d) => Some(&d.payload),
            Self::StatusSuspended(d) | Self::StatusRevoked(d) => Some(&d.payload),
        }
    }

    /// Rebuild an event from its tag and a JSON data object.
    pub fn from_parts(kind: EventKind, data: serde_json::Value) -> Result<Self, CoreError> {
        let malformed = |e: serde_json::Error| CoreError::MalformedBlockData {
            event: kind.to_string(),
            reason: e.to_string(),
        };
        Ok(match kind {
            EventKind::Creation => Self::Creation(serde_json::from_value(data).map_err(malformed)?),
            EventKind::UpdateVerification => {
                Self::UpdateVerification(serde_json::from_value(data).map_err(malformed)?)
            }
            EventKind::StatusSuspended => {
                Self::StatusSuspended(serde_json::from_value(data).map_err(malformed)?)
            }
            EventKind::StatusRevoked => {
                Self::StatusRevoked(serde_json::from_value(data).map_err(malformed)?)
            }
        })
    }

    /// Serialize only the data part as a JSON value.
    pub fn data_json(&self) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::to_value(self.data_ref())?)
    }

    fn data_ref(&self) -> EventDataRef<'_> {
        match self {
            Self::Creation(d) => EventDataRef::Genesis(d),
            Self::UpdateVerification(d) => EventDataRef::Verification(d),
            Self::StatusSuspended(d) | Self::StatusRevoked(d) => EventDataRef::StatusChange(d),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum EventDataRef<'a> {
    Genesis(&'a GenesisData),
    Verification(&'a VerificationData),
    StatusChange(&'a StatusChangeData),
}

/// Hash-covered view of a block. Field order here is the canonical order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalBlock<'a> {
    index: u64,
    timestamp: i64,
    event: EventKind,
    data: EventDataRef<'a>,
    previous_hash: &'a str,
}

/// Full serialized view of a block (canonical fields plus `hash`).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockRef<'a> {
    index: u64,
    timestamp: i64,
    event: EventKind,
    data: EventDataRef<'a>,
    previous_hash: &'a str,
    hash: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    index: u64,
    timestamp: i64,
    event: EventKind,
    data: serde_json::Value,
    previous_hash: String,
    hash: String,
}

/// A single committed entry of an identity ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    /// Position in the ledger (0-based).
    pub index: u64,
    /// Commit time (unix milliseconds).
    pub timestamp: i64,
    /// Event tag and data.
    pub event: LedgerEvent,
    /// Hash of the previous block, or [`GENESIS_PREVIOUS_HASH`].
    pub previous_hash: String,
    /// Hash over the canonical serialization of all other fields.
    pub hash: String,
}

impl Block {
    /// Build a block and compute its hash.
    pub fn seal(
        index: u64,
        timestamp: i64,
        event: LedgerEvent,
        previous_hash: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let mut block = Self {
            index,
            timestamp,
            event,
            previous_hash: previous_hash.into(),
            hash: String::new(),
        };
        block.hash = block.compute_hash()?;
        Ok(block)
    }

    /// Build the genesis block of a new ledger.
    pub fn genesis(public_key_pem: impl Into<String>, timestamp: i64) -> Result<Self, CoreError> {
        let data = GenesisData {
            public_key: public_key_pem.into(),
            status: IdentityStatus::Active,
            verification_level: 0,
        };
        Self::seal(0, timestamp, LedgerEvent::Creation(data), GENESIS_PREVIOUS_HASH)
    }

    /// Canonical bytes covered by the block hash (everything except `hash`).
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let canonical = CanonicalBlock {
            index: self.index,
            timestamp: self.timestamp,
            event: self.event.kind(),
            data: self.event.data_ref(),
            previous_hash: &self.previous_hash,
        };
        Ok(serde_json::to_vec(&canonical)?)
    }

    /// Recompute the hash from the canonical field set.
    pub fn compute_hash(&self) -> Result<String, CoreError> {
        let bytes = self.canonical_bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    /// Whether the stored `hash` matches the recomputed one.
    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash().map(|h| h == self.hash).unwrap_or(false)
    }

    /// The event tag.
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BlockRef {
            index: self.index,
            timestamp: self.timestamp,
            event: self.event.kind(),
            data: self.event.data_ref(),
            previous_hash: &self.previous_hash,
            hash: &self.hash,
        }
        .serialize(serializer)
    }
}

impl TryFrom<RawBlock> for Block {
    type Error = CoreError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        Ok(Self {
            index: raw.index,
            timestamp: raw.timestamp,
            event: LedgerEvent::from_parts(raw.event, raw.data)?,
            previous_hash: raw.previous_hash,
            hash: raw.hash,
        })
    }
}
