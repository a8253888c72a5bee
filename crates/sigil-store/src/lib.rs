//! Sigil Store: the persistence interface consumed by the identity engine,
//! with in-memory, SQLite and (feature `rocksdb`) RocksDB backends.

pub mod backend;
pub mod backends;
pub mod error;
pub mod traits;

pub use backend::{open_store, StoreBackend};
pub use backends::memory::MemoryStore;
pub use backends::sqlite::SqliteStore;
#[cfg(feature = "rocksdb")]
pub use backends::rocks::RocksStore;
pub use error::StoreError;
pub use traits::IdentityStore;
