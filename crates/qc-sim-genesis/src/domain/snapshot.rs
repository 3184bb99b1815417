//! # Snapshot Documents
//!
//! The genesis document format read by the importer and written by the
//! `qc-simgen` binary.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::entities::{GenesisTimestamp, SimAccount};
use super::errors::GenesisError;

/// A complete starting state: chain id, genesis time and app state.
///
/// `app_state` is kept as the exact bytes found in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Genesis time, if the document carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_time: Option<DateTime<Utc>>,
    /// Chain identifier.
    pub chain_id: String,
    /// Module name → module payload.
    pub app_state: Box<RawValue>,
}

impl SnapshotDocument {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, GenesisError> {
        let bytes = fs::read(path).map_err(|source| GenesisError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| GenesisError::decode(format!("genesis file {}", path.display()), e))
    }

    /// Embedded app state bytes, verbatim.
    pub fn app_state_bytes(&self) -> &[u8] {
        self.app_state.get().as_bytes()
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, GenesisError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GenesisError::serialization("genesis document", e))
    }
}

/// Result of one orchestrated assembly.
#[derive(Debug, Clone)]
pub struct AssembledGenesis {
    /// Encoded composite state.
    pub app_state: Vec<u8>,
    /// Accounts the simulator may act as.
    pub accounts: Vec<SimAccount>,
    /// Chain identifier.
    pub chain_id: String,
    /// Genesis timestamp shared by every module.
    pub genesis_time: GenesisTimestamp,
}

impl AssembledGenesis {
    /// Wrap the result into a snapshot document.
    pub fn to_document(&self) -> Result<SnapshotDocument, GenesisError> {
        let text = std::str::from_utf8(&self.app_state).map_err(|e| {
            GenesisError::serialization(
                "app state",
                serde::ser::Error::custom(format!("not valid UTF-8: {}", e)),
            )
        })?;
        let app_state = RawValue::from_string(text.to_string())
            .map_err(|e| GenesisError::decode("app state", e))?;
        Ok(SnapshotDocument {
            genesis_time: Some(self.genesis_time),
            chain_id: self.chain_id.clone(),
            app_state,
        })
    }
}
