//! # Mint Module
//!
//! Inflation schedule and the minter's starting state.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::{Dec, ValidatorUpdate, BOND_DENOM};

use super::dec_with_prec;
use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "mint";

/// Five-second blocks over a 365.25-day year.
pub const BLOCKS_PER_YEAR: u64 = 60 * 60 * 8766 / 5;

/// Inflation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintParams {
    /// Denomination minted.
    pub mint_denom: String,
    /// Maximum yearly change of the inflation rate.
    pub inflation_rate_change: Dec,
    /// Inflation ceiling.
    pub inflation_max: Dec,
    /// Inflation floor.
    pub inflation_min: Dec,
    /// Target bonded ratio.
    pub goal_bonded: Dec,
    /// Expected blocks per year.
    pub blocks_per_year: u64,
}

/// Minter state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minter {
    /// Current inflation rate.
    pub inflation: Dec,
    /// Current annual provisions.
    pub annual_provisions: Dec,
}

/// Mint module genesis payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintGenesis {
    /// Minter state.
    pub minter: Minter,
    /// Inflation parameters.
    pub params: MintParams,
}

impl MintGenesis {
    fn with(inflation: Dec, inflation_rate_change: Dec) -> Self {
        Self {
            minter: Minter {
                inflation,
                annual_provisions: Dec::ZERO,
            },
            params: MintParams {
                mint_denom: BOND_DENOM.to_string(),
                inflation_rate_change,
                inflation_max: Dec::percent(20),
                inflation_min: Dec::percent(7),
                goal_bonded: Dec::percent(67),
                blocks_per_year: BLOCKS_PER_YEAR,
            },
        }
    }

    fn validate(&self) -> Result<(), GenesisError> {
        let p = &self.params;
        if p.mint_denom.is_empty() {
            return Err(GenesisError::validation(MODULE_NAME, "mint denom cannot be blank"));
        }
        if p.inflation_min > p.inflation_max {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!(
                    "inflation min {} exceeds inflation max {}",
                    p.inflation_min, p.inflation_max
                ),
            ));
        }
        if p.goal_bonded.is_zero() || p.goal_bonded > Dec::ONE {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!("goal bonded must be in (0, 1]: {}", p.goal_bonded),
            ));
        }
        if p.blocks_per_year == 0 {
            return Err(GenesisError::validation(MODULE_NAME, "blocks per year must be positive"));
        }
        Ok(())
    }
}

impl Default for MintGenesis {
    fn default() -> Self {
        Self::with(Dec::percent(13), Dec::percent(13))
    }
}

/// Randomizes the starting inflation.
pub struct MintGenerator;

impl ModuleGenesisGenerator for MintGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let ap = inputs.app_params;
        let inflation = ap.get_or_generate("inflation", rng, |r| dec_with_prec(r.gen_range(0..99), 2))?;
        let rate_change = ap.get_or_generate("inflation_rate_change", rng, |r| {
            dec_with_prec(r.gen_range(0..99), 2)
        })?;
        slot.write(&MintGenesis::with(inflation, rate_change))?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct MintModule;

impl ModuleBasic for MintModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &MintGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<MintGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for MintModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: MintGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;
        ctx.put_json(MODULE_NAME, "minter", &genesis.minter)?;
        ctx.put_json(MODULE_NAME, "params", &genesis.params)?;
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let fallback = MintGenesis::default();
        let genesis = MintGenesis {
            minter: ctx.get_json(MODULE_NAME, "minter")?.unwrap_or(fallback.minter),
            params: ctx.get_json(MODULE_NAME, "params")?.unwrap_or(fallback.params),
        };
        to_raw(MODULE_NAME, &genesis).map(Some)
    }
}
