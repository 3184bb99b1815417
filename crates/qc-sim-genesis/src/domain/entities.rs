//! # Domain Entities
//!
//! Simulation accounts, sampled global parameters and derived values passed
//! between module generators.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use shared_crypto::{Secp256k1PublicKey, SimulationKeyPair};
use shared_types::Address;

use super::errors::GenesisError;

/// Single wall-clock value shared by every generator in one run.
pub type GenesisTimestamp = DateTime<Utc>;

/// Chain identifier reported for randomized genesis.
pub const SIMULATION_CHAIN_ID: &str = "simulation";

/// Seed length for freshly created simulation accounts.
pub const ACCOUNT_SEED_LEN: usize = 32;

/// An address paired with a simulation-only credential.
#[derive(Clone, Debug)]
pub struct SimAccount {
    /// Account address.
    pub address: Address,
    /// Public half of the credential.
    pub pub_key: Secp256k1PublicKey,
    /// Non-authoritative signing credential.
    pub credential: Arc<SimulationKeyPair>,
}

impl SimAccount {
    /// Account whose address is derived from the credential's public key.
    pub fn from_credential(credential: SimulationKeyPair) -> Self {
        let pub_key = credential.public_key();
        Self {
            address: Address::new(pub_key.to_address()),
            pub_key,
            credential: Arc::new(credential),
        }
    }

    /// Pair an existing address with a regenerated credential.
    ///
    /// The address is kept verbatim and does not match the key.
    pub fn with_address(address: Address, credential: SimulationKeyPair) -> Self {
        Self {
            address,
            pub_key: credential.public_key(),
            credential: Arc::new(credential),
        }
    }

    /// Create `count` accounts from seeds drawn from `rng`.
    pub fn random_accounts(
        rng: &mut dyn RngCore,
        count: usize,
    ) -> Result<Vec<SimAccount>, GenesisError> {
        let mut accounts = Vec::with_capacity(count);
        for _ in 0..count {
            let mut seed = [0u8; ACCOUNT_SEED_LEN];
            rng.fill_bytes(&mut seed);
            accounts.push(Self::from_credential(SimulationKeyPair::from_seed(&seed)?));
        }
        Ok(accounts)
    }
}

/// Global scalars drawn once per randomized assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerOutput {
    /// Stake granted to every account, in `[0, 10^12)`.
    pub initial_stake: u128,
    /// Accounts bonded as validators at genesis, `<= numAccounts`.
    pub num_initially_bonded: usize,
}

/// A value one generator hands to later generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derived {
    /// Nothing to pass on.
    None,
    /// Staking unbonding duration.
    UnbondingTime(Duration),
}

/// Values committed by generators that have already run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DerivedValues {
    unbonding_time: Option<Duration>,
}

impl DerivedValues {
    /// Record a generator's return value.
    pub fn record(&mut self, derived: Derived) {
        match derived {
            Derived::None => {}
            Derived::UnbondingTime(d) => self.unbonding_time = Some(d),
        }
    }

    /// Staking unbonding duration, failing on behalf of `consumer` when
    /// staking has not run yet.
    pub fn unbonding_time(&self, consumer: &str) -> Result<Duration, GenesisError> {
        self.unbonding_time.ok_or_else(|| {
            GenesisError::generator(
                consumer,
                "unbonding time not available: staking generator has not run",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_accounts_deterministic() {
        let a = SimAccount::random_accounts(&mut StdRng::seed_from_u64(9), 3).unwrap();
        let b = SimAccount::random_accounts(&mut StdRng::seed_from_u64(9), 3).unwrap();
        let addrs_a: Vec<_> = a.iter().map(|acc| acc.address).collect();
        let addrs_b: Vec<_> = b.iter().map(|acc| acc.address).collect();
        assert_eq!(addrs_a, addrs_b);
    }

    #[test]
    fn test_random_account_address_matches_key() {
        let accs = SimAccount::random_accounts(&mut StdRng::seed_from_u64(1), 1).unwrap();
        assert_eq!(accs[0].address.0, accs[0].pub_key.to_address());
    }

    #[test]
    fn test_derived_values_missing_unbonding_time() {
        let derived = DerivedValues::default();
        let err = derived.unbonding_time("slashing").unwrap_err();
        assert!(matches!(
            err,
            GenesisError::GeneratorFailure { ref module, .. } if module == "slashing"
        ));
    }

    #[test]
    fn test_derived_values_record() {
        let mut derived = DerivedValues::default();
        derived.record(Derived::None);
        derived.record(Derived::UnbondingTime(Duration::from_secs(60)));
        assert_eq!(
            derived.unbonding_time("slashing").unwrap(),
            Duration::from_secs(60)
        );
    }
}
