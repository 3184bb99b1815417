//! # Supply Module
//!
//! Total token supply at genesis: every account's balance plus every
//! initial delegation.

use std::collections::HashSet;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::{Coin, ValidatorUpdate};

use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "supply";

/// Supply module genesis payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyGenesis {
    /// Total supply per denomination.
    pub supply: Vec<Coin>,
}

impl SupplyGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        let mut seen = HashSet::new();
        for coin in &self.supply {
            if !seen.insert(coin.denom.as_str()) {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("duplicate denomination {}", coin.denom),
                ));
            }
        }
        Ok(())
    }
}

/// Computes supply as `initial_stake × (accounts + bonded)`.
pub struct SupplyGenerator;

impl ModuleGenesisGenerator for SupplyGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &[super::accounts::MODULE_NAME]
    }

    fn generate(
        &self,
        _rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let holders = (inputs.accounts.len() + inputs.sampler.num_initially_bonded) as u128;
        let total = inputs
            .sampler
            .initial_stake
            .checked_mul(holders)
            .ok_or_else(|| GenesisError::generator(MODULE_NAME, "total supply overflows"))?;
        slot.write(&SupplyGenesis {
            supply: vec![Coin::stake(total)],
        })?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct SupplyModule;

impl ModuleBasic for SupplyModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &SupplyGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<SupplyGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for SupplyModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: SupplyGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;
        ctx.put_json(MODULE_NAME, "supply", &genesis.supply)?;
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let supply = ctx.get_json(MODULE_NAME, "supply")?.unwrap_or_default();
        to_raw(MODULE_NAME, &SupplyGenesis { supply }).map(Some)
    }
}
