//! # Composite State
//!
//! The full initial application state, partitioned by owning module. Each
//! entry is the module's raw JSON payload; keys are kept sorted so the
//! encoded bytes are deterministic.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::errors::GenesisError;

/// Module name → raw module payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeState(BTreeMap<String, Box<RawValue>>);

impl CompositeState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an app-state object.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GenesisError> {
        serde_json::from_slice(bytes).map_err(|e| GenesisError::decode("app state", e))
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GenesisError> {
        serde_json::to_vec(&self.0).map_err(|e| GenesisError::serialization("app state", e))
    }

    /// Raw payload of `module`.
    pub fn get(&self, module: &str) -> Option<&RawValue> {
        self.0.get(module).map(|raw| raw.as_ref())
    }

    /// Decode the payload of `module`.
    pub fn decode<T: DeserializeOwned>(&self, module: &str) -> Result<Option<T>, GenesisError> {
        self.get(module)
            .map(|raw| {
                serde_json::from_str(raw.get())
                    .map_err(|e| GenesisError::decode(format!("{} genesis", module), e))
            })
            .transpose()
    }

    /// Set the raw payload of `module`.
    pub fn insert_raw(&mut self, module: impl Into<String>, raw: Box<RawValue>) {
        self.0.insert(module.into(), raw);
    }

    /// Whether `module` has an entry.
    pub fn contains(&self, module: &str) -> bool {
        self.0.contains_key(module)
    }

    /// Module names in key order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of module entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the state has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write access to exactly one module's entry.
    pub fn slot<'a>(&'a mut self, module: &'a str) -> ModuleSlot<'a> {
        ModuleSlot {
            module,
            state: self,
        }
    }
}

/// Handle over a single module's entry in a [`CompositeState`].
pub struct ModuleSlot<'a> {
    module: &'a str,
    state: &'a mut CompositeState,
}

impl ModuleSlot<'_> {
    /// Owning module.
    pub fn module(&self) -> &str {
        self.module
    }

    /// Replace the entry with `value`.
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<(), GenesisError> {
        let raw = serde_json::value::to_raw_value(value)
            .map_err(|e| GenesisError::serialization(format!("{} genesis", self.module), e))?;
        self.state.insert_raw(self.module, raw);
        Ok(())
    }

    /// Decode the current entry, if any.
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, GenesisError> {
        self.state.decode(self.module)
    }
}

/// Encode any module payload to a raw JSON value.
pub fn to_raw<T: Serialize>(module: &str, value: &T) -> Result<Box<RawValue>, GenesisError> {
    serde_json::value::to_raw_value(value)
        .map_err(|e| GenesisError::serialization(format!("{} genesis", module), e))
}

/// Decode a module payload from raw JSON.
pub fn from_raw<T: DeserializeOwned>(module: &str, raw: &RawValue) -> Result<T, GenesisError> {
    serde_json::from_str(raw.get()).map_err(|e| GenesisError::decode(format!("{} genesis", module), e))
}
