//! Global anchor index: the latest committed hash of every ledger, stored
//! apart from the ledger itself so an out-of-band rollback or edit shows
//! up as a divergence.

use std::sync::Arc;

use sigil_core::{AnchorRecord, LedgerId};
use sigil_store::IdentityStore;

use crate::error::IdentityError;

#[derive(Clone)]
pub struct AnchorIndex {
    store: Arc<dyn IdentityStore>,
}

impl AnchorIndex {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Record `latest_hash` as the head of ledger `id`. Call only after the
    /// block carrying that hash has been persisted.
    pub async fn upsert(
        &self,
        id: &LedgerId,
        latest_hash: &str,
    ) -> Result<AnchorRecord, IdentityError> {
        let record = AnchorRecord::new(id.clone(), latest_hash);
        self.store.upsert_anchor(&record).await?;
        tracing::debug!(id = %id, hash = %latest_hash, "anchor updated");
        Ok(record)
    }

    pub async fn get(&self, id: &LedgerId) -> Result<AnchorRecord, IdentityError> {
        self.store
            .get_anchor(id)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("anchor for ledger {}", id)))
    }
}
