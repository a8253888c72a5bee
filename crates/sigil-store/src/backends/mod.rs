pub mod memory;
pub mod sqlite;
#[cfg(feature = "rocksdb")]
pub mod rocks;
