//! # Staking Module
//!
//! Staking parameters and the initially bonded validator set.
//!
//! The first `num_initially_bonded` accounts each become a bonded validator
//! holding `initial_stake` tokens, self-delegated. The sampled unbonding
//! duration is handed to later generators as [`Derived::UnbondingTime`].

use std::collections::HashSet;
use std::time::Duration;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_with::{serde_as, DisplayFromStr, DurationSeconds};
use shared_types::{Address, Dec, ValidatorUpdate, BOND_DENOM, POWER_REDUCTION};
use tracing::debug;

use super::dec_with_prec;
use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "staking";

/// Unbonding duration bounds, in seconds (one minute to six days).
pub const MIN_UNBONDING_SECS: u64 = 60;
/// Upper unbonding bound.
pub const MAX_UNBONDING_SECS: u64 = 60 * 60 * 24 * 3 * 2;
/// Upper bound of the max-validators draw.
pub const MAX_VALIDATORS_BOUND: u16 = 250;

const PARAMS_KEY: &str = "params";
const VALIDATOR_PREFIX: &str = "validator/";
const DELEGATION_PREFIX: &str = "delegation/";
const LAST_POWER_KEY: &str = "last_total_power";

/// Staking parameters.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    /// Time tokens stay locked after unbonding.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub unbonding_time: Duration,
    /// Active set size.
    pub max_validators: u16,
    /// Maximum concurrent unbonding/redelegation entries per pair.
    pub max_entries: u16,
    /// Denomination that can be bonded.
    pub bond_denom: String,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            unbonding_time: Duration::from_secs(60 * 60 * 24 * 3 * 7),
            max_validators: 100,
            max_entries: 7,
            bond_denom: BOND_DENOM.to_string(),
        }
    }
}

/// Validator bonding status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondStatus {
    /// Not in the active set, not unbonding.
    Unbonded,
    /// Leaving the active set.
    Unbonding,
    /// In the active set.
    Bonded,
}

/// Validator commission terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    /// Current rate.
    pub rate: Dec,
    /// Rate ceiling.
    pub max_rate: Dec,
    /// Maximum daily change.
    pub max_change_rate: Dec,
}

/// One validator.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator address.
    pub operator_address: Address,
    /// Hex-encoded compressed secp256k1 consensus key.
    pub consensus_pubkey: String,
    /// Whether the validator is jailed.
    #[serde(default)]
    pub jailed: bool,
    /// Bonding status.
    pub status: BondStatus,
    /// Bonded tokens.
    #[serde_as(as = "DisplayFromStr")]
    pub tokens: u128,
    /// Total delegator shares.
    pub delegator_shares: Dec,
    /// Commission terms.
    pub commission: Commission,
}

impl Validator {
    /// Consensus power: tokens divided by the power reduction.
    pub fn power(&self) -> i64 {
        i64::try_from(self.tokens / POWER_REDUCTION).unwrap_or(i64::MAX)
    }

    fn consensus_key(&self) -> Result<[u8; 33], GenesisError> {
        let bytes = hex::decode(&self.consensus_pubkey).map_err(|e| {
            GenesisError::validation(
                MODULE_NAME,
                format!("validator {} consensus key: {}", self.operator_address, e),
            )
        })?;
        <[u8; 33]>::try_from(bytes.as_slice()).map_err(|_| {
            GenesisError::validation(
                MODULE_NAME,
                format!(
                    "validator {} consensus key must be 33 bytes, got {}",
                    self.operator_address,
                    bytes.len()
                ),
            )
        })
    }
}

/// One delegation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// Delegator.
    pub delegator_address: Address,
    /// Validator operator.
    pub validator_address: Address,
    /// Shares held.
    pub shares: Dec,
}

/// Staking module genesis payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingGenesis {
    /// Module parameters.
    pub params: StakingParams,
    /// Sum of active validator power.
    #[serde(default)]
    pub last_total_power: i64,
    /// Validators.
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// Delegations.
    #[serde(default)]
    pub delegations: Vec<Delegation>,
}

impl StakingGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        let params = &self.params;
        if params.unbonding_time.is_zero() {
            return Err(GenesisError::validation(MODULE_NAME, "unbonding time must be positive"));
        }
        if params.max_validators == 0 {
            return Err(GenesisError::validation(MODULE_NAME, "max validators must be positive"));
        }
        if params.bond_denom.is_empty() {
            return Err(GenesisError::validation(MODULE_NAME, "bond denom cannot be blank"));
        }

        let mut operators = HashSet::with_capacity(self.validators.len());
        for validator in &self.validators {
            if !operators.insert(validator.operator_address) {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("duplicate validator {}", validator.operator_address),
                ));
            }
            validator.consensus_key()?;
            if validator.status == BondStatus::Bonded && validator.jailed {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("validator {} is bonded and jailed", validator.operator_address),
                ));
            }
            if validator.delegator_shares.is_zero() && validator.tokens > 0 {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("validator {} has tokens but no shares", validator.operator_address),
                ));
            }
            let c = &validator.commission;
            if c.rate > c.max_rate || c.max_change_rate > c.max_rate || c.max_rate > Dec::ONE {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("validator {} has inconsistent commission", validator.operator_address),
                ));
            }
        }

        for delegation in &self.delegations {
            if !operators.contains(&delegation.validator_address) {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!(
                        "delegation from {} targets unknown validator {}",
                        delegation.delegator_address, delegation.validator_address
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Randomizes parameters and creates the bonded validator set.
pub struct StakingGenerator;

impl StakingGenerator {
    fn commission(rng: &mut dyn RngCore) -> Commission {
        let max_rate = dec_with_prec(rng.gen_range(1..=100), 2);
        let atomics = max_rate.atomics();
        Commission {
            rate: Dec::from_atomics(rng.gen_range(0..=atomics)),
            max_rate,
            max_change_rate: Dec::from_atomics(rng.gen_range(0..=atomics)),
        }
    }
}

impl ModuleGenesisGenerator for StakingGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &[super::accounts::MODULE_NAME]
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let bonded = inputs.sampler.num_initially_bonded;
        if bonded > inputs.accounts.len() {
            return Err(GenesisError::generator(
                MODULE_NAME,
                format!(
                    "{} bonded validators requested but only {} accounts exist",
                    bonded,
                    inputs.accounts.len()
                ),
            ));
        }

        let ap = inputs.app_params;
        let unbonding_secs: u64 = ap.get_or_generate("unbonding_time", rng, |r| {
            r.gen_range(MIN_UNBONDING_SECS..=MAX_UNBONDING_SECS)
        })?;
        let max_validators: u16 = ap.get_or_generate("max_validators", rng, |r| {
            r.gen_range(1..=MAX_VALIDATORS_BOUND)
        })?;
        let unbonding_time = Duration::from_secs(unbonding_secs);

        let amount = inputs.sampler.initial_stake;
        let shares = Dec::from_ratio(amount, 1)
            .ok_or_else(|| GenesisError::generator(MODULE_NAME, "initial stake overflows shares"))?;

        let mut validators = Vec::with_capacity(bonded);
        let mut delegations = Vec::with_capacity(bonded);
        for account in &inputs.accounts[..bonded] {
            validators.push(Validator {
                operator_address: account.address,
                consensus_pubkey: hex::encode(account.pub_key.as_bytes()),
                jailed: false,
                status: BondStatus::Bonded,
                tokens: amount,
                delegator_shares: shares,
                commission: Self::commission(rng),
            });
            delegations.push(Delegation {
                delegator_address: account.address,
                validator_address: account.address,
                shares,
            });
        }

        debug!(
            "[Staking] {} validators, unbonding {}s, max validators {}",
            validators.len(),
            unbonding_secs,
            max_validators
        );

        slot.write(&StakingGenesis {
            params: StakingParams {
                unbonding_time,
                max_validators,
                ..StakingParams::default()
            },
            last_total_power: 0,
            validators,
            delegations,
        })?;
        Ok(Derived::UnbondingTime(unbonding_time))
    }
}

/// Lifecycle handle. The only standard module that reports validator
/// updates at genesis.
pub struct StakingModule;

impl ModuleBasic for StakingModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &StakingGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<StakingGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for StakingModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: StakingGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;

        ctx.put_json(MODULE_NAME, PARAMS_KEY, &genesis.params)?;

        let mut active: Vec<&Validator> = genesis
            .validators
            .iter()
            .filter(|v| v.status == BondStatus::Bonded && !v.jailed && v.power() > 0)
            .collect();
        // Highest power first, operator address breaks ties.
        active.sort_by(|a, b| {
            b.power()
                .cmp(&a.power())
                .then_with(|| a.operator_address.as_bytes().cmp(b.operator_address.as_bytes()))
        });
        active.truncate(usize::from(genesis.params.max_validators));

        let mut updates = Vec::with_capacity(active.len());
        let mut total_power: i64 = 0;
        for validator in active {
            total_power = total_power.saturating_add(validator.power());
            updates.push(ValidatorUpdate {
                pub_key: validator.consensus_key()?,
                power: validator.power(),
            });
        }

        for validator in &genesis.validators {
            ctx.put_json(
                MODULE_NAME,
                &format!("{}{}", VALIDATOR_PREFIX, validator.operator_address),
                validator,
            )?;
        }
        for delegation in &genesis.delegations {
            ctx.put_json(
                MODULE_NAME,
                &format!(
                    "{}{}/{}",
                    DELEGATION_PREFIX, delegation.delegator_address, delegation.validator_address
                ),
                delegation,
            )?;
        }
        ctx.put_json(MODULE_NAME, LAST_POWER_KEY, &total_power)?;

        debug!(
            "[Staking] init genesis: {} validators, {} active, total power {}",
            genesis.validators.len(),
            updates.len(),
            total_power
        );
        Ok(updates)
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let genesis = StakingGenesis {
            params: ctx.get_json(MODULE_NAME, PARAMS_KEY)?.unwrap_or_default(),
            last_total_power: ctx.get_json(MODULE_NAME, LAST_POWER_KEY)?.unwrap_or(0),
            validators: ctx.scan_json(MODULE_NAME, VALIDATOR_PREFIX)?,
            delegations: ctx.scan_json(MODULE_NAME, DELEGATION_PREFIX)?,
        };
        to_raw(MODULE_NAME, &genesis).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{AppParams, CompositeState, DerivedValues, SamplerOutput, SimAccount};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;
    use std::sync::Arc;

    fn generate(
        accounts: &[SimAccount],
        sampler: SamplerOutput,
        params: &AppParams,
    ) -> Result<(Derived, CompositeState), GenesisError> {
        let registry = TypeRegistry::builder().build();
        let derived = DerivedValues::default();
        let inputs = GeneratorInputs {
            accounts,
            sampler,
            genesis_time: Utc::now(),
            app_params: params,
            registry: &registry,
            derived: &derived,
        };
        let mut state = CompositeState::new();
        let out = StakingGenerator.generate(
            &mut StdRng::seed_from_u64(11),
            &inputs,
            &mut state.slot(MODULE_NAME),
        )?;
        Ok((out, state))
    }

    #[test]
    fn test_first_accounts_become_validators() {
        let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(2), 5).unwrap();
        let sampler = SamplerOutput {
            initial_stake: 3_000_000,
            num_initially_bonded: 2,
        };
        let (derived, state) = generate(&accounts, sampler, &AppParams::new()).unwrap();
        let genesis: StakingGenesis = state.decode(MODULE_NAME).unwrap().unwrap();

        assert_eq!(genesis.validators.len(), 2);
        assert_eq!(genesis.validators[0].operator_address, accounts[0].address);
        assert_eq!(genesis.validators[1].operator_address, accounts[1].address);
        assert_eq!(genesis.delegations.len(), 2);
        genesis.validate().unwrap();

        let secs = genesis.params.unbonding_time.as_secs();
        assert!((MIN_UNBONDING_SECS..=MAX_UNBONDING_SECS).contains(&secs));
        assert!((1..=MAX_VALIDATORS_BOUND).contains(&genesis.params.max_validators));
        assert_eq!(derived, Derived::UnbondingTime(genesis.params.unbonding_time));
    }

    #[test]
    fn test_app_param_overrides_unbonding_time() {
        let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(2), 1).unwrap();
        let mut params = AppParams::new();
        params.insert("unbonding_time", Value::from(120u64));
        let sampler = SamplerOutput {
            initial_stake: 1,
            num_initially_bonded: 0,
        };
        let (derived, _) = generate(&accounts, sampler, &params).unwrap();
        assert_eq!(derived, Derived::UnbondingTime(Duration::from_secs(120)));
    }

    #[test]
    fn test_too_many_bonded_fails() {
        let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(2), 1).unwrap();
        let sampler = SamplerOutput {
            initial_stake: 1,
            num_initially_bonded: 2,
        };
        let err = generate(&accounts, sampler, &AppParams::new()).unwrap_err();
        assert!(matches!(err, GenesisError::GeneratorFailure { .. }));
    }

    #[test]
    fn test_init_genesis_reports_power() {
        let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(4), 3).unwrap();
        let sampler = SamplerOutput {
            initial_stake: 5_500_000,
            num_initially_bonded: 3,
        };
        let mut params = AppParams::new();
        params.insert("max_validators", Value::from(100u16));
        let (_, state) = generate(&accounts, sampler, &params).unwrap();
        let registry = TypeRegistry::builder().build();
        let ctx = AppContext::new(Arc::new(MemoryStore::new()), "simulation", Utc::now());

        let updates = StakingModule
            .init_genesis(&ctx, &registry, state.get(MODULE_NAME).unwrap())
            .unwrap();
        assert_eq!(updates.len(), 3);
        assert!(updates.iter().all(|u| u.power == 5));

        let exported = StakingModule.export_genesis(&ctx, &registry).unwrap().unwrap();
        let exported: StakingGenesis = from_raw(MODULE_NAME, &exported).unwrap();
        assert_eq!(exported.validators.len(), 3);
        assert_eq!(exported.last_total_power, 15);
    }

    #[test]
    fn test_low_power_validator_not_reported() {
        let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(4), 1).unwrap();
        let sampler = SamplerOutput {
            initial_stake: 999_999,
            num_initially_bonded: 1,
        };
        let (_, state) = generate(&accounts, sampler, &AppParams::new()).unwrap();
        let registry = TypeRegistry::builder().build();
        let ctx = AppContext::new(Arc::new(MemoryStore::new()), "simulation", Utc::now());
        let updates = StakingModule
            .init_genesis(&ctx, &registry, state.get(MODULE_NAME).unwrap())
            .unwrap();
        assert!(updates.is_empty());
    }
}
