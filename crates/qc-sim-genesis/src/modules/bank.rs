//! # Bank Module
//!
//! Whether token transfers are enabled from genesis.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::ValidatorUpdate;

use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "bank";

/// Bank module genesis payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankGenesis {
    /// Whether sends are allowed.
    pub send_enabled: bool,
}

impl Default for BankGenesis {
    fn default() -> Self {
        Self { send_enabled: true }
    }
}

/// Randomizes the send switch, enabled roughly 95% of the time.
pub struct BankGenerator;

impl ModuleGenesisGenerator for BankGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let send_enabled = inputs
            .app_params
            .get_or_generate("send_enabled", rng, |r| r.gen_range(0..101) <= 95)?;
        slot.write(&BankGenesis { send_enabled })?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct BankModule;

impl ModuleBasic for BankModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &BankGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<BankGenesis>(MODULE_NAME, raw).map(|_| ())
    }
}

impl AppModuleGenesis for BankModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: BankGenesis = from_raw(MODULE_NAME, raw)?;
        ctx.put_json(MODULE_NAME, "send_enabled", &genesis.send_enabled)?;
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let send_enabled = ctx.get_json(MODULE_NAME, "send_enabled")?.unwrap_or(true);
        to_raw(MODULE_NAME, &BankGenesis { send_enabled }).map(Some)
    }
}
