//! # Store Port
//!
//! Key-value access to live application state, used by module
//! `init_genesis` / `export_genesis`.

use thiserror::Error;

/// Store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend-specific failure.
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Key-value store abstraction.
pub trait KvStore: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    /// Store `value` under `key`.
    fn set(&self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;
    /// Remove `key`.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;
    /// All entries whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
}
