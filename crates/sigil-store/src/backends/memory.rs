use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sigil_core::{AnchorRecord, Attestation, Block, Challenge, Did, LedgerId, Subject};

use crate::error::StoreError;
use crate::traits::IdentityStore;

/// Process-local store backed by concurrent maps.
///
/// Nothing survives a restart. Each map entry is guarded by its DashMap
/// shard lock, so the length check and push in `append_block` happen
/// atomically with respect to other writers of the same ledger.
#[derive(Default)]
pub struct MemoryStore {
    subjects: DashMap<Did, Subject>,
    ledgers: DashMap<LedgerId, Vec<Block>>,
    anchors: DashMap<LedgerId, AnchorRecord>,
    challenges: DashMap<Did, Challenge>,
    attestations: DashMap<Did, Vec<Attestation>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a ledger wholesale, bypassing the append checks.
    ///
    /// Used for imports and to simulate out-of-band edits when exercising
    /// tamper detection.
    pub fn replace_ledger(&self, id: &LedgerId, blocks: Vec<Block>) {
        self.ledgers.insert(id.clone(), blocks);
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_subject(&self, subject: &Subject) -> Result<bool, StoreError> {
        match self.subjects.entry(subject.did.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(subject.clone());
                Ok(true)
            }
        }
    }

    async fn get_subject(&self, did: &Did) -> Result<Option<Subject>, StoreError> {
        Ok(self.subjects.get(did).map(|s| s.clone()))
    }

    async fn create_ledger(&self, id: &LedgerId, genesis: &Block) -> Result<(), StoreError> {
        match self.ledgers.entry(id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(vec![genesis.clone()]);
                Ok(())
            }
        }
    }

    async fn get_ledger(&self, id: &LedgerId) -> Result<Option<Vec<Block>>, StoreError> {
        Ok(self.ledgers.get(id).map(|l| l.clone()))
    }

    async fn append_block(&self, id: &LedgerId, block: &Block) -> Result<(), StoreError> {
        let mut ledger = self
            .ledgers
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let expected = ledger.len() as u64;
        if block.index != expected {
            return Err(StoreError::Conflict {
                id: id.to_string(),
                expected,
                actual: block.index,
            });
        }
        ledger.push(block.clone());
        Ok(())
    }

    async fn get_anchor(&self, id: &LedgerId) -> Result<Option<AnchorRecord>, StoreError> {
        Ok(self.anchors.get(id).map(|a| a.clone()))
    }

    async fn upsert_anchor(&self, record: &AnchorRecord) -> Result<(), StoreError> {
        self.anchors.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_challenge(&self, did: &Did) -> Result<Option<Challenge>, StoreError> {
        Ok(self.challenges.get(did).map(|c| c.clone()))
    }

    async fn set_challenge(&self, challenge: &Challenge) -> Result<(), StoreError> {
        self.challenges
            .insert(challenge.did.clone(), challenge.clone());
        Ok(())
    }

    async fn delete_challenge(&self, did: &Did) -> Result<(), StoreError> {
        self.challenges.remove(did);
        Ok(())
    }

    async fn list_attestations(&self, did: &Did) -> Result<Vec<Attestation>, StoreError> {
        Ok(self
            .attestations
            .get(did)
            .map(|list| list.clone())
            .unwrap_or_default())
    }

    async fn append_attestation(
        &self,
        did: &Did,
        attestation: &Attestation,
    ) -> Result<(), StoreError> {
        self.attestations
            .entry(did.clone())
            .or_default()
            .push(attestation.clone());
        Ok(())
    }

    async fn set_attestation_revoked(
        &self,
        did: &Did,
        attestation_id: &str,
    ) -> Result<bool, StoreError> {
        let Some(mut list) = self.attestations.get_mut(did) else {
            return Ok(false);
        };
        match list.iter_mut().find(|a| a.id == attestation_id) {
            Some(att) => {
                att.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
