//! # Slashing Module
//!
//! Liveness and double-sign penalties. Evidence older than the staking
//! unbonding period can no longer be punished, so `max_evidence_age` is
//! taken from the staking generator's output.

use std::time::Duration;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_with::{serde_as, DurationSeconds};
use shared_types::{Address, Dec, ValidatorUpdate};

use super::dec_with_prec;
use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "slashing";

const PARAMS_KEY: &str = "params";
const SIGNING_INFO_PREFIX: &str = "signing_info/";

/// Slashing parameters.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashingParams {
    /// Blocks over which liveness is measured.
    pub signed_blocks_window: i64,
    /// Minimum share of the window a validator must sign.
    pub min_signed_per_window: Dec,
    /// Jail time after downtime.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub downtime_jail_duration: Duration,
    /// Stake fraction slashed for double signing.
    pub slash_fraction_double_sign: Dec,
    /// Stake fraction slashed for downtime.
    pub slash_fraction_downtime: Dec,
    /// Oldest evidence still punishable.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub max_evidence_age: Duration,
}

impl Default for SlashingParams {
    fn default() -> Self {
        Self {
            signed_blocks_window: 100,
            min_signed_per_window: Dec::percent(50),
            downtime_jail_duration: Duration::from_secs(600),
            slash_fraction_double_sign: Dec::percent(5),
            slash_fraction_downtime: Dec::percent(1),
            max_evidence_age: Duration::from_secs(60 * 2 * 60 * 24 * 3),
        }
    }
}

/// Liveness record of one validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningInfo {
    /// Consensus address.
    pub address: Address,
    /// Height the validator started signing.
    pub start_height: i64,
    /// Missed blocks in the current window.
    pub missed_blocks_counter: i64,
}

/// Slashing module genesis payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashingGenesis {
    /// Module parameters.
    pub params: SlashingParams,
    /// Per-validator liveness records.
    #[serde(default)]
    pub signing_infos: Vec<SigningInfo>,
}

impl SlashingGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        let p = &self.params;
        if p.signed_blocks_window <= 0 {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!("signed blocks window must be positive: {}", p.signed_blocks_window),
            ));
        }
        for (name, value) in [
            ("min_signed_per_window", p.min_signed_per_window),
            ("slash_fraction_double_sign", p.slash_fraction_double_sign),
            ("slash_fraction_downtime", p.slash_fraction_downtime),
        ] {
            if value > Dec::ONE {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("{} exceeds one: {}", name, value),
                ));
            }
        }
        if p.max_evidence_age.is_zero() {
            return Err(GenesisError::validation(MODULE_NAME, "max evidence age must be positive"));
        }
        if let Some(info) = self.signing_infos.iter().find(|i| i.missed_blocks_counter < 0) {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!("negative missed blocks for {}", info.address),
            ));
        }
        Ok(())
    }
}

/// Randomizes penalties; needs the staking unbonding time.
pub struct SlashingGenerator;

impl ModuleGenesisGenerator for SlashingGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &[super::staking::MODULE_NAME]
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let max_evidence_age = inputs.derived.unbonding_time(MODULE_NAME)?;

        let ap = inputs.app_params;
        let signed_blocks_window =
            ap.get_or_generate("signed_blocks_window", rng, |r| r.gen_range(10..1_000))?;
        let min_signed_per_window = ap.get_or_generate("min_signed_per_window", rng, |r| {
            dec_with_prec(r.gen_range(1..=10), 1)
        })?;
        let jail_secs: u64 = ap.get_or_generate("downtime_jail_duration", rng, |r| {
            r.gen_range(60..=60 * 60 * 24)
        })?;
        let slash_fraction_double_sign = ap.get_or_generate("slash_fraction_double_sign", rng, |r| {
            Dec::from_atomics(Dec::ONE.atomics() / r.gen_range(1..=50u128))
        })?;
        let slash_fraction_downtime = ap.get_or_generate("slash_fraction_downtime", rng, |r| {
            Dec::from_atomics(Dec::ONE.atomics() / r.gen_range(1..=200u128))
        })?;

        slot.write(&SlashingGenesis {
            params: SlashingParams {
                signed_blocks_window,
                min_signed_per_window,
                downtime_jail_duration: Duration::from_secs(jail_secs),
                slash_fraction_double_sign,
                slash_fraction_downtime,
                max_evidence_age,
            },
            signing_infos: Vec::new(),
        })?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct SlashingModule;

impl ModuleBasic for SlashingModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &SlashingGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<SlashingGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for SlashingModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: SlashingGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;
        ctx.put_json(MODULE_NAME, PARAMS_KEY, &genesis.params)?;
        for info in &genesis.signing_infos {
            ctx.put_json(MODULE_NAME, &format!("{}{}", SIGNING_INFO_PREFIX, info.address), info)?;
        }
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let genesis = SlashingGenesis {
            params: ctx.get_json(MODULE_NAME, PARAMS_KEY)?.unwrap_or_default(),
            signing_infos: ctx.scan_json(MODULE_NAME, SIGNING_INFO_PREFIX)?,
        };
        to_raw(MODULE_NAME, &genesis).map(Some)
    }
}
