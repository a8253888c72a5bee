//! Backend selection from configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backends::memory::MemoryStore;
use crate::backends::sqlite::SqliteStore;
use crate::error::StoreError;
use crate::traits::IdentityStore;

/// Which storage engine to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Sqlite,
    Rocksdb,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
            Self::Rocksdb => write!(f, "rocksdb"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            "rocksdb" => Ok(Self::Rocksdb),
            other => Err(StoreError::Unsupported(format!("unknown backend '{}'", other))),
        }
    }
}

/// Open a store. `path` is a file for SQLite and a directory for RocksDB;
/// it is ignored for the in-memory backend.
pub fn open_store(backend: StoreBackend, path: &Path) -> Result<Arc<dyn IdentityStore>, StoreError> {
    tracing::info!(backend = %backend, path = %path.display(), "opening identity store");
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Sqlite => Ok(Arc::new(SqliteStore::open(path)?)),
        #[cfg(feature = "rocksdb")]
        StoreBackend::Rocksdb => Ok(Arc::new(crate::backends::rocks::RocksStore::open(path)?)),
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::Rocksdb => Err(StoreError::Unsupported(
            "built without the `rocksdb` feature".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse_and_display() {
        for backend in [StoreBackend::Memory, StoreBackend::Sqlite, StoreBackend::Rocksdb] {
            assert_eq!(backend.to_string().parse::<StoreBackend>().unwrap(), backend);
        }
        assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert!("postgres".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::default(), StoreBackend::Sqlite);
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store(StoreBackend::Memory, Path::new("")).unwrap();
        assert!(store
            .get_ledger(&sigil_core::LedgerId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[cfg(not(feature = "rocksdb"))]
    #[test]
    fn test_rocksdb_requires_feature() {
        assert!(matches!(
            open_store(StoreBackend::Rocksdb, Path::new("/tmp/unused")),
            Err(StoreError::Unsupported(_))
        ));
    }
}
