//! # Accounts Module
//!
//! Genesis balances for every simulation account. Accounts past the
//! initially bonded set may be turned into vesting accounts.

use std::collections::HashSet;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::{Address, Coin, ValidatorUpdate};

use crate::domain::{from_raw, to_raw, CompositeState, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "accounts";

const ACCOUNT_PREFIX: &str = "acc/";

/// Upper bound of the long vesting window (30 days).
const LONG_VESTING_SECS: i64 = 60 * 60 * 24 * 30;
/// Upper bound of the short vesting window (12 hours).
const SHORT_VESTING_SECS: i64 = 60 * 60 * 12;

/// How locked coins unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VestingKind {
    /// Linear release between start and end.
    Continuous,
    /// Everything releases at end.
    Delayed,
}

/// Vesting terms attached to an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingSchedule {
    /// Release curve.
    pub kind: VestingKind,
    /// Coins locked at genesis.
    pub original_vesting: Vec<Coin>,
    /// Vesting start.
    pub start_time: DateTime<Utc>,
    /// Vesting end, strictly after start.
    pub end_time: DateTime<Utc>,
}

/// One account in the genesis state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    /// Account address.
    pub address: Address,
    /// Balance at genesis.
    pub coins: Vec<Coin>,
    /// Next expected sequence number.
    #[serde(default)]
    pub sequence: u64,
    /// Vesting terms, for vesting accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting: Option<VestingSchedule>,
}

/// Accounts module genesis payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsGenesis {
    /// Genesis accounts.
    pub accounts: Vec<GenesisAccount>,
}

impl AccountsGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        let mut seen = HashSet::with_capacity(self.accounts.len());
        for account in &self.accounts {
            if !seen.insert(account.address) {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("duplicate account {}", account.address),
                ));
            }
            if account.coins.iter().any(|c| c.denom.is_empty()) {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("account {} holds a coin without denomination", account.address),
                ));
            }
            if let Some(vesting) = &account.vesting {
                if vesting.end_time <= vesting.start_time {
                    return Err(GenesisError::validation(
                        MODULE_NAME,
                        format!("account {} vesting ends before it starts", account.address),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Addresses listed by the accounts entry of an encoded app state.
///
/// A missing entry is a decode failure: a snapshot without accounts cannot
/// be simulated against.
pub fn addresses_from_app_state(state: &CompositeState) -> Result<Vec<Address>, GenesisError> {
    let listing: AccountListing = state.decode(MODULE_NAME)?.ok_or_else(|| {
        GenesisError::decode(
            "genesis file app state",
            serde::de::Error::custom(format!("missing '{}' module entry", MODULE_NAME)),
        )
    })?;
    Ok(listing.accounts.into_iter().map(|a| a.address).collect())
}

/// Address-only view of the accounts entry; other account fields are ignored.
#[derive(Deserialize)]
struct AccountListing {
    #[serde(default)]
    accounts: Vec<ListedAccount>,
}

#[derive(Deserialize)]
struct ListedAccount {
    address: Address,
}

/// Randomizes balances and vesting.
pub struct AccountsGenerator;

impl AccountsGenerator {
    fn vesting(
        rng: &mut dyn RngCore,
        coins: &[Coin],
        genesis_time: DateTime<Utc>,
    ) -> VestingSchedule {
        let window = if rng.gen_range(0..100) < 50 {
            LONG_VESTING_SECS
        } else {
            SHORT_VESTING_SECS
        };
        let mut length = rng.gen_range(0..window);
        if length == 0 {
            length = 1;
        }
        let kind = if rng.gen_range(0..100) < 50 {
            VestingKind::Continuous
        } else {
            VestingKind::Delayed
        };
        VestingSchedule {
            kind,
            original_vesting: coins.to_vec(),
            start_time: genesis_time,
            end_time: genesis_time + ChronoDuration::seconds(length),
        }
    }
}

impl ModuleGenesisGenerator for AccountsGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let coins = vec![Coin::stake(inputs.sampler.initial_stake)];
        let mut accounts = Vec::with_capacity(inputs.accounts.len());

        for (i, account) in inputs.accounts.iter().enumerate() {
            // Vesting only once the bonded set is exhausted.
            let vesting = if i > inputs.sampler.num_initially_bonded && rng.gen_range(0..100) < 50 {
                Some(Self::vesting(rng, &coins, inputs.genesis_time))
            } else {
                None
            };
            accounts.push(GenesisAccount {
                address: account.address,
                coins: coins.clone(),
                sequence: 0,
                vesting,
            });
        }

        slot.write(&AccountsGenesis { accounts })?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct AccountsModule;

impl ModuleBasic for AccountsModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &AccountsGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<AccountsGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for AccountsModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: AccountsGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;
        for account in &genesis.accounts {
            ctx.put_json(MODULE_NAME, &format!("{}{}", ACCOUNT_PREFIX, account.address), account)?;
        }
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let accounts = ctx.scan_json(MODULE_NAME, ACCOUNT_PREFIX)?;
        to_raw(MODULE_NAME, &AccountsGenesis { accounts }).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppParams, DerivedValues, SamplerOutput, SimAccount};
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genesis_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_600_000_000, 0).single().unwrap()
    }

    fn run(accounts: &[SimAccount], bonded: usize, seed: u64) -> AccountsGenesis {
        let registry = TypeRegistry::builder().build();
        let params = AppParams::new();
        let derived = DerivedValues::default();
        let inputs = GeneratorInputs {
            accounts,
            sampler: SamplerOutput {
                initial_stake: 500,
                num_initially_bonded: bonded,
            },
            genesis_time: genesis_time(),
            app_params: &params,
            registry: &registry,
            derived: &derived,
        };
        let mut state = CompositeState::new();
        let mut slot = state.slot(MODULE_NAME);
        let mut rng = StdRng::seed_from_u64(seed);
        AccountsGenerator.generate(&mut rng, &inputs, &mut slot).unwrap();
        state.decode(MODULE_NAME).unwrap().unwrap()
    }

    #[test]
    fn test_every_account_funded_in_order() {
        let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(3), 6).unwrap();
        let genesis = run(&accounts, 2, 1);

        assert_eq!(genesis.accounts.len(), 6);
        for (generated, sim) in genesis.accounts.iter().zip(&accounts) {
            assert_eq!(generated.address, sim.address);
            assert_eq!(generated.coins, vec![Coin::stake(500)]);
        }
        genesis.validate().unwrap();
    }

    #[test]
    fn test_bonded_accounts_never_vest() {
        let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(3), 8).unwrap();
        for seed in 0..20 {
            let genesis = run(&accounts, 4, seed);
            for account in genesis.accounts.iter().take(5) {
                assert!(account.vesting.is_none());
            }
            for account in &genesis.accounts {
                if let Some(v) = &account.vesting {
                    assert!(v.end_time > v.start_time);
                    assert_eq!(v.start_time, genesis_time());
                }
            }
        }
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let account = GenesisAccount {
            address: Address::new([1; 20]),
            coins: vec![],
            sequence: 0,
            vesting: None,
        };
        let genesis = AccountsGenesis {
            accounts: vec![account.clone(), account],
        };
        assert!(matches!(
            genesis.validate(),
            Err(GenesisError::Validation { .. })
        ));
    }

    #[test]
    fn test_addresses_from_app_state_ignores_other_fields() {
        let state = CompositeState::from_bytes(
            br#"{"accounts":{"accounts":[
                {"address":"0101010101010101010101010101010101010101"},
                {"address":"0202020202020202020202020202020202020202","coins":[],"extra":1}
            ]}}"#,
        )
        .unwrap();
        let addresses = addresses_from_app_state(&state).unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0], Address::from([1u8; 20]));
    }

    #[test]
    fn test_addresses_from_app_state_missing_entry() {
        let state = CompositeState::from_bytes(br#"{"bank":{}}"#).unwrap();
        assert!(matches!(
            addresses_from_app_state(&state),
            Err(GenesisError::Decode { .. })
        ));
    }
}
