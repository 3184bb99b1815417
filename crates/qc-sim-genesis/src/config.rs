//! # Configuration
//!
//! Orchestrator input ([`AssemblyConfig`]) and the binary's run
//! configuration ([`SimulationConfig`]).
//!
//! ## Environment
//!
//! | variable | field |
//! |---|---|
//! | `QC_SIM_SEED` | `seed` |
//! | `QC_SIM_NUM_ACCOUNTS` | `num_accounts` |
//! | `QC_SIM_GENESIS_FILE` | `assembly.genesis_file` |
//! | `QC_SIM_PARAMS_FILE` | `assembly.params_file` |
//! | `QC_SIM_GENESIS_TIME` | `assembly.genesis_time` (Unix seconds, 0 = random) |
//! | `QC_SIM_OUTPUT` | `output` |

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::GenesisError;

/// How the orchestrator will produce the composite state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyMode<'a> {
    /// Load an existing snapshot document.
    Import(&'a Path),
    /// Run every module generator, optionally with a params file.
    Randomized(Option<&'a Path>),
}

/// Inputs to one orchestrated assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyConfig {
    /// Snapshot document to import.
    pub genesis_file: Option<PathBuf>,
    /// Per-key sampling overrides for randomized assembly.
    pub params_file: Option<PathBuf>,
    /// Explicit genesis time in Unix seconds; `None` draws one at random.
    pub genesis_time: Option<i64>,
}

impl AssemblyConfig {
    /// Import `path`.
    pub fn import(path: impl Into<PathBuf>) -> Self {
        Self {
            genesis_file: Some(path.into()),
            ..Self::default()
        }
    }

    /// Randomize with overrides from `path`.
    pub fn with_params(path: impl Into<PathBuf>) -> Self {
        Self {
            params_file: Some(path.into()),
            ..Self::default()
        }
    }

    /// Pin the genesis time.
    pub fn at(mut self, unix_secs: i64) -> Self {
        self.genesis_time = Some(unix_secs);
        self
    }

    /// Selected mode. Supplying both files is a configuration error.
    pub fn mode(&self) -> Result<AssemblyMode<'_>, GenesisError> {
        match (&self.genesis_file, &self.params_file) {
            (Some(genesis_file), Some(params_file)) => Err(GenesisError::ConflictingInputs {
                genesis_file: genesis_file.clone(),
                params_file: params_file.clone(),
            }),
            (Some(genesis_file), None) => Ok(AssemblyMode::Import(genesis_file)),
            (None, params_file) => Ok(AssemblyMode::Randomized(params_file.as_deref())),
        }
    }
}

/// Run configuration for the `qc-simgen` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Seed for the shared random source.
    pub seed: u64,
    /// Simulation accounts created for randomized runs.
    pub num_accounts: usize,
    /// Orchestrator inputs.
    pub assembly: AssemblyConfig,
    /// Where the snapshot document is written; stdout when unset.
    pub output: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_accounts: 10,
            assembly: AssemblyConfig::default(),
            output: None,
        }
    }
}

impl SimulationConfig {
    /// Defaults overridden from `QC_SIM_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden from `lookup`. Malformed values are warned about
    /// and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(seed) = lookup("QC_SIM_SEED") {
            match seed.parse() {
                Ok(s) => config.seed = s,
                Err(_) => warn!("QC_SIM_SEED must be an unsigned integer, got '{}'", seed),
            }
        }
        if let Some(count) = lookup("QC_SIM_NUM_ACCOUNTS") {
            match count.parse() {
                Ok(n) => config.num_accounts = n,
                Err(_) => warn!("QC_SIM_NUM_ACCOUNTS must be an unsigned integer, got '{}'", count),
            }
        }
        if let Some(time) = lookup("QC_SIM_GENESIS_TIME") {
            match time.parse::<i64>() {
                Ok(0) => config.assembly.genesis_time = None,
                Ok(t) => config.assembly.genesis_time = Some(t),
                Err(_) => warn!("QC_SIM_GENESIS_TIME must be Unix seconds, got '{}'", time),
            }
        }
        config.assembly.genesis_file = lookup("QC_SIM_GENESIS_FILE")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        config.assembly.params_file = lookup("QC_SIM_PARAMS_FILE")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        config.output = lookup("QC_SIM_OUTPUT")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        info!(
            "[Config] seed={} accounts={} genesis_file={:?} params_file={:?}",
            config.seed, config.num_accounts, config.assembly.genesis_file, config.assembly.params_file
        );
        config
    }

    /// Reject inconsistent configuration before any work starts.
    pub fn validate(&self) -> Result<(), GenesisError> {
        self.assembly.mode().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::from_lookup(lookup(&[]));
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.seed, 42);
        assert_eq!(config.num_accounts, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = SimulationConfig::from_lookup(lookup(&[
            ("QC_SIM_SEED", "7"),
            ("QC_SIM_NUM_ACCOUNTS", "3"),
            ("QC_SIM_PARAMS_FILE", "params.json"),
            ("QC_SIM_GENESIS_TIME", "1600000000"),
            ("QC_SIM_OUTPUT", "out.json"),
        ]));
        assert_eq!(config.seed, 7);
        assert_eq!(config.num_accounts, 3);
        assert_eq!(config.assembly.genesis_time, Some(1_600_000_000));
        assert_eq!(
            config.assembly.mode().unwrap(),
            AssemblyMode::Randomized(Some(Path::new("params.json")))
        );
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_malformed_values_ignored() {
        let config = SimulationConfig::from_lookup(lookup(&[
            ("QC_SIM_SEED", "abc"),
            ("QC_SIM_GENESIS_TIME", "0"),
        ]));
        assert_eq!(config.seed, 42);
        assert_eq!(config.assembly.genesis_time, None);
    }

    #[test]
    fn test_both_files_conflict() {
        let config = SimulationConfig::from_lookup(lookup(&[
            ("QC_SIM_GENESIS_FILE", "genesis.json"),
            ("QC_SIM_PARAMS_FILE", "params.json"),
        ]));
        assert!(matches!(
            config.validate(),
            Err(GenesisError::ConflictingInputs { .. })
        ));
    }

    #[test]
    fn test_import_mode() {
        let config = AssemblyConfig::import("g.json").at(5);
        assert_eq!(config.mode().unwrap(), AssemblyMode::Import(Path::new("g.json")));
        assert_eq!(config.genesis_time, Some(5));
    }
}
