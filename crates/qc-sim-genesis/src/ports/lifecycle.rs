//! # Lifecycle Port
//!
//! Runtime-facing genesis contract each module exposes.
//!
//! ```text
//! DefaultGenesis ──→ ValidateGenesis ──→ InitGenesis ══ live app ══→ ExportGenesis
//! ```
//!
//! `init_genesis` is called once at process start; `export_genesis` may be
//! called any number of times afterwards.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use shared_types::ValidatorUpdate;

use super::store::KvStore;
use crate::domain::GenesisError;
use crate::registry::TypeRegistry;

/// Module metadata and static genesis hooks.
pub trait ModuleBasic: Send + Sync {
    /// Module name, also its key in the composite state.
    fn name(&self) -> &'static str;

    /// Canonical empty-state payload.
    fn default_genesis(&self, registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError>;

    /// Structural and semantic check. Never mutates state.
    fn validate_genesis(&self, registry: &TypeRegistry, raw: &RawValue)
        -> Result<(), GenesisError>;
}

/// Apply and extract a module's genesis against a live application.
pub trait AppModuleGenesis: ModuleBasic {
    /// Apply `raw` into live state. Modules that manage validator
    /// membership report the resulting updates; all others return none.
    fn init_genesis(
        &self,
        ctx: &AppContext,
        registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError>;

    /// Current live state as a genesis payload, or `None` for modules
    /// without independent state.
    fn export_genesis(
        &self,
        ctx: &AppContext,
        registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError>;
}

/// Boxed lifecycle handle.
pub type DynAppModule = Box<dyn AppModuleGenesis>;

/// Live application handle passed to lifecycle hooks.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn KvStore>,
    /// Chain the application runs.
    pub chain_id: String,
    /// Block time at genesis.
    pub block_time: DateTime<Utc>,
}

impl AppContext {
    /// Context over `store`.
    pub fn new(store: Arc<dyn KvStore>, chain_id: impl Into<String>, block_time: DateTime<Utc>) -> Self {
        Self {
            store,
            chain_id: chain_id.into(),
            block_time,
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    fn key(module: &str, key: &str) -> Vec<u8> {
        format!("{}/{}", module, key).into_bytes()
    }

    /// Store `value` as JSON under `module/key`.
    pub fn put_json<T: Serialize>(&self, module: &str, key: &str, value: &T) -> Result<(), GenesisError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| GenesisError::serialization(format!("{} store entry {}", module, key), e))?;
        self.store.set(&Self::key(module, key), bytes)?;
        Ok(())
    }

    /// Decode the JSON value under `module/key`.
    pub fn get_json<T: DeserializeOwned>(&self, module: &str, key: &str) -> Result<Option<T>, GenesisError> {
        self.store
            .get(&Self::key(module, key))?
            .map(|bytes| {
                serde_json::from_slice(&bytes)
                    .map_err(|e| GenesisError::decode(format!("{} store entry {}", module, key), e))
            })
            .transpose()
    }

    /// Decode every JSON value under `module/prefix`, in key order.
    pub fn scan_json<T: DeserializeOwned>(&self, module: &str, prefix: &str) -> Result<Vec<T>, GenesisError> {
        self.store
            .prefix_scan(&Self::key(module, prefix))?
            .into_iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    GenesisError::decode(
                        format!("{} store entry {}", module, String::from_utf8_lossy(&key)),
                        e,
                    )
                })
            })
            .collect()
    }
}
