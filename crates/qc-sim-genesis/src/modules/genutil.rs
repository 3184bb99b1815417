//! # Genutil Module
//!
//! Holds genesis transactions. It has no randomized generator and no state
//! of its own to export; its payload only travels through the default and
//! validation hooks.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use shared_types::ValidatorUpdate;
use tracing::debug;

use crate::domain::{from_raw, to_raw, GenesisError};
use crate::ports::{AppContext, AppModuleGenesis, ModuleBasic};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "genutil";

/// Genutil module genesis payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenutilGenesis {
    /// Signed genesis transactions.
    #[serde(default)]
    pub gen_txs: Vec<Value>,
}

impl GenutilGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        match self.gen_txs.iter().position(|tx| !tx.is_object()) {
            Some(i) => Err(GenesisError::validation(
                MODULE_NAME,
                format!("genesis transaction {} is not an object", i),
            )),
            None => Ok(()),
        }
    }
}

/// Lifecycle handle.
pub struct GenutilModule;

impl ModuleBasic for GenutilModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &GenutilGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<GenutilGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for GenutilModule {
    fn init_genesis(
        &self,
        _ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: GenutilGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;
        debug!("[Genutil] {} genesis transactions", genesis.gen_txs.len());
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        _ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        Ok(None)
    }
}
