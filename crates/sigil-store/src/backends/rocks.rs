//! RocksDB backend, one column family per logical table.

use std::path::Path;

use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sigil_core::{AnchorRecord, Attestation, Block, Challenge, Did, LedgerId, Subject};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::traits::IdentityStore;

const CF_SUBJECTS: &str = "subjects";
const CF_LEDGERS: &str = "ledgers";
const CF_ANCHORS: &str = "anchors";
const CF_CHALLENGES: &str = "challenges";
const CF_ATTESTATIONS: &str = "attestations";

/// RocksDB-backed store.
///
/// Ledgers and attestation lists are stored as whole JSON values per key so
/// every write is a single atomic put. Read-modify-write sequences are
/// serialized by `write_lock`.
pub struct RocksStore {
    db: DB,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a database directory with all column families.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = [CF_SUBJECTS, CF_LEDGERS, CF_ANCHORS, CF_CHALLENGES, CF_ATTESTATIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        tracing::debug!(path = %path.display(), "opened rocksdb store");

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: &str, value: &T) -> Result<(), StoreError> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", cf_name)))?;
        self.db.put_cf(cf, key.as_bytes(), serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>, StoreError> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", cf_name)))?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn delete(&self, cf_name: &str, key: &str) -> Result<(), StoreError> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", cf_name)))?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for RocksStore {
    async fn create_subject(&self, subject: &Subject) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.get::<Subject>(CF_SUBJECTS, subject.did.uri())?.is_some() {
            return Ok(false);
        }
        self.put(CF_SUBJECTS, subject.did.uri(), subject)?;
        Ok(true)
    }

    async fn get_subject(&self, did: &Did) -> Result<Option<Subject>, StoreError> {
        self.get(CF_SUBJECTS, did.uri())
    }

    async fn create_ledger(&self, id: &LedgerId, genesis: &Block) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.get::<Vec<Block>>(CF_LEDGERS, id.as_str())?.is_some() {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        self.put(CF_LEDGERS, id.as_str(), &vec![genesis])
    }

    async fn get_ledger(&self, id: &LedgerId) -> Result<Option<Vec<Block>>, StoreError> {
        self.get(CF_LEDGERS, id.as_str())
    }

    async fn append_block(&self, id: &LedgerId, block: &Block) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut ledger: Vec<Block> = self
            .get(CF_LEDGERS, id.as_str())?
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
        self.put(CF_LEDGERS, id.as_str(), &ledger)
    }

    async fn get_anchor(&self, id: &LedgerId) -> Result<Option<AnchorRecord>, StoreError> {
        self.get(CF_ANCHORS, id.as_str())
    }

    async fn upsert_anchor(&self, record: &AnchorRecord) -> Result<(), StoreError> {
        self.put(CF_ANCHORS, record.id.as_str(), record)
    }

    async fn get_challenge(&self, did: &Did) -> Result<Option<Challenge>, StoreError> {
        self.get(CF_CHALLENGES, did.uri())
    }

    async fn set_challenge(&self, challenge: &Challenge) -> Result<(), StoreError> {
        self.put(CF_CHALLENGES, challenge.did.uri(), challenge)
    }

    async fn delete_challenge(&self, did: &Did) -> Result<(), StoreError> {
        self.delete(CF_CHALLENGES, did.uri())
    }

    async fn list_attestations(&self, did: &Did) -> Result<Vec<Attestation>, StoreError> {
        Ok(self.get(CF_ATTESTATIONS, did.uri())?.unwrap_or_default())
    }

    async fn append_attestation(
        &self,
        did: &Did,
        attestation: &Attestation,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut list: Vec<Attestation> = self.get(CF_ATTESTATIONS, did.uri())?.unwrap_or_default();
        list.push(attestation.clone());
        self.put(CF_ATTESTATIONS, did.uri(), &list)
    }

    async fn set_attestation_revoked(
        &self,
        did: &Did,
        attestation_id: &str,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut list: Vec<Attestation> = self.get(CF_ATTESTATIONS, did.uri())?.unwrap_or_default();
        let Some(att) = list.iter_mut().find(|a| a.id == attestation_id) else {
            return Ok(false);
        };
        att.revoked = true;
        self.put(CF_ATTESTATIONS, did.uri(), &list)?;
        Ok(true)
    }
}
