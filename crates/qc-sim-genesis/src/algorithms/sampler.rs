//! # Parameter Sampler
//!
//! Draws the two global scalars every stake-aware generator shares, and the
//! genesis timestamp. Draw order is part of determinism: stake first, then
//! the bonded count.

use chrono::DateTime;
use rand::{Rng, RngCore};
use tracing::info;

use crate::domain::{GenesisError, GenesisTimestamp, SamplerOutput};

/// Exclusive upper bound for the per-account initial stake.
pub const MAX_INITIAL_STAKE: u64 = 1_000_000_000_000;

/// Exclusive upper bound for the initially bonded validator count.
pub const MAX_INITIALLY_BONDED: usize = 250;

/// Exclusive upper bound for random genesis timestamps (year 9999).
pub const MAX_GENESIS_UNIX_SECS: i64 = 253_373_529_600;

/// Sample initial stake and bonded validator count for `num_accounts`.
pub fn sample(rng: &mut dyn RngCore, num_accounts: usize) -> SamplerOutput {
    let initial_stake = u128::from(rng.gen_range(0..MAX_INITIAL_STAKE));
    let num_initially_bonded = rng.gen_range(0..MAX_INITIALLY_BONDED).min(num_accounts);

    info!(
        stake_per_account = %initial_stake,
        initially_bonded_validators = num_initially_bonded,
        "[Sampler] Selected randomly generated parameters for simulated genesis"
    );

    SamplerOutput {
        initial_stake,
        num_initially_bonded,
    }
}

/// Uniform timestamp in `[0, MAX_GENESIS_UNIX_SECS)` seconds.
pub fn random_timestamp(rng: &mut dyn RngCore) -> Result<GenesisTimestamp, GenesisError> {
    let secs = rng.gen_range(0..MAX_GENESIS_UNIX_SECS);
    DateTime::from_timestamp(secs, 0).ok_or(GenesisError::InvalidTimestamp(secs))
}

/// Explicit override if given, otherwise a random draw.
pub fn resolve_timestamp(
    explicit_unix_secs: Option<i64>,
    rng: &mut dyn RngCore,
) -> Result<GenesisTimestamp, GenesisError> {
    match explicit_unix_secs {
        Some(secs) => DateTime::from_timestamp(secs, 0).ok_or(GenesisError::InvalidTimestamp(secs)),
        None => random_timestamp(rng),
    }
}
