//! # Gov Module
//!
//! Governance deposit, voting and tally parameters.

use std::time::Duration;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_with::{serde_as, DurationSeconds};
use shared_types::{Coin, Dec, ValidatorUpdate};

use super::dec_with_prec;
use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "gov";

/// Default deposit and voting period (two days).
const DEFAULT_PERIOD_SECS: u64 = 60 * 60 * 24 * 2;

/// Deposit requirements.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositParams {
    /// Minimum deposit for a proposal to enter voting.
    pub min_deposit: Vec<Coin>,
    /// Maximum time to reach the minimum deposit.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub max_deposit_period: Duration,
}

/// Voting window.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingParams {
    /// Length of the voting period.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub voting_period: Duration,
}

/// Tally thresholds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyParams {
    /// Minimum participation.
    pub quorum: Dec,
    /// Minimum yes share.
    pub threshold: Dec,
    /// Veto share that rejects a proposal.
    pub veto: Dec,
}

/// Gov module genesis payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovGenesis {
    /// First proposal id.
    pub starting_proposal_id: u64,
    /// Deposit requirements.
    pub deposit_params: DepositParams,
    /// Voting window.
    pub voting_params: VotingParams,
    /// Tally thresholds.
    pub tally_params: TallyParams,
}

impl Default for GovGenesis {
    fn default() -> Self {
        Self {
            starting_proposal_id: 1,
            deposit_params: DepositParams {
                min_deposit: vec![Coin::stake(10_000_000)],
                max_deposit_period: Duration::from_secs(DEFAULT_PERIOD_SECS),
            },
            voting_params: VotingParams {
                voting_period: Duration::from_secs(DEFAULT_PERIOD_SECS),
            },
            tally_params: TallyParams {
                quorum: dec_with_prec(334, 3),
                threshold: Dec::percent(50),
                veto: dec_with_prec(334, 3),
            },
        }
    }
}

impl GovGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        let tally = &self.tally_params;
        if tally.quorum > Dec::ONE {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!("quorum too large: {}", tally.quorum),
            ));
        }
        if tally.threshold.is_zero() || tally.threshold > Dec::ONE {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!("threshold must be in (0, 1]: {}", tally.threshold),
            ));
        }
        if tally.veto.is_zero() || tally.veto > Dec::ONE {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!("veto must be in (0, 1]: {}", tally.veto),
            ));
        }
        if self.deposit_params.max_deposit_period.is_zero() {
            return Err(GenesisError::validation(MODULE_NAME, "max deposit period must be positive"));
        }
        if self.voting_params.voting_period.is_zero() {
            return Err(GenesisError::validation(MODULE_NAME, "voting period must be positive"));
        }
        Ok(())
    }
}

/// Randomizes governance parameters.
pub struct GovGenerator;

impl ModuleGenesisGenerator for GovGenerator {
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
        let min_deposit: u128 = ap.get_or_generate("deposit_params_min_deposit", rng, |r| r.gen_range(1..=1_000))?;
        let deposit_period: u64 = ap.get_or_generate("deposit_params_deposit_period", rng, |r| {
            r.gen_range(1..=2 * DEFAULT_PERIOD_SECS)
        })?;
        let voting_period: u64 = ap.get_or_generate("voting_params_voting_period", rng, |r| {
            r.gen_range(1..=2 * DEFAULT_PERIOD_SECS)
        })?;
        let quorum = ap.get_or_generate("tally_params_quorum", rng, |r| {
            dec_with_prec(r.gen_range(334..=500), 3)
        })?;
        let threshold = ap.get_or_generate("tally_params_threshold", rng, |r| {
            dec_with_prec(r.gen_range(450..=550), 3)
        })?;
        let veto = ap.get_or_generate("tally_params_veto", rng, |r| {
            dec_with_prec(r.gen_range(250..=334), 3)
        })?;

        slot.write(&GovGenesis {
            starting_proposal_id: 1,
            deposit_params: DepositParams {
                min_deposit: vec![Coin::stake(min_deposit)],
                max_deposit_period: Duration::from_secs(deposit_period),
            },
            voting_params: VotingParams {
                voting_period: Duration::from_secs(voting_period),
            },
            tally_params: TallyParams {
                quorum,
                threshold,
                veto,
            },
        })?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct GovModule;

impl ModuleBasic for GovModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &GovGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<GovGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for GovModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: GovGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;
        ctx.put_json(MODULE_NAME, "genesis", &genesis)?;
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let genesis: GovGenesis = ctx.get_json(MODULE_NAME, "genesis")?.unwrap_or_default();
        to_raw(MODULE_NAME, &genesis).map(Some)
    }
}
