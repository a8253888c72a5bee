use async_trait::async_trait;
use sigil_core::{AnchorRecord, Attestation, Block, Challenge, Did, LedgerId, Subject};

use crate::error::StoreError;

/// Persistence interface consumed by the identity engine.
///
/// Four logical tables, all keyed by subject: ledgers (ordered blocks per
/// ledger id), anchors (`id → latestHash`), attestations (append-only list
/// per DID) and a single ephemeral challenge slot per DID. Implementations
/// must be safe to share across tasks.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a subject if its DID is unknown. Returns `false` when a record
    /// already existed; the stored record is left untouched.
    async fn create_subject(&self, subject: &Subject) -> Result<bool, StoreError>;

    async fn get_subject(&self, did: &Did) -> Result<Option<Subject>, StoreError>;

    /// Persist a one-block ledger. Fails with `AlreadyExists` if the id is taken.
    async fn create_ledger(&self, id: &LedgerId, genesis: &Block) -> Result<(), StoreError>;

    async fn get_ledger(&self, id: &LedgerId) -> Result<Option<Vec<Block>>, StoreError>;

    /// Append a block. `block.index` must equal the current ledger length,
    /// otherwise `Conflict` is returned and nothing is written.
    async fn append_block(&self, id: &LedgerId, block: &Block) -> Result<(), StoreError>;

    async fn get_anchor(&self, id: &LedgerId) -> Result<Option<AnchorRecord>, StoreError>;

    async fn upsert_anchor(&self, record: &AnchorRecord) -> Result<(), StoreError>;

    async fn get_challenge(&self, did: &Did) -> Result<Option<Challenge>, StoreError>;

    /// Store a challenge, replacing any prior one for the same DID.
    async fn set_challenge(&self, challenge: &Challenge) -> Result<(), StoreError>;

    async fn delete_challenge(&self, did: &Did) -> Result<(), StoreError>;

    /// Attestations for a DID in issuance order.
    async fn list_attestations(&self, did: &Did) -> Result<Vec<Attestation>, StoreError>;

    async fn append_attestation(&self, did: &Did, attestation: &Attestation)
        -> Result<(), StoreError>;

    /// Mark an attestation revoked. Returns `false` if no such attestation
    /// exists for the DID.
    async fn set_attestation_revoked(
        &self,
        did: &Did,
        attestation_id: &str,
    ) -> Result<bool, StoreError>;
}
