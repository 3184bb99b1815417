//! # Genesis Orchestrator
//!
//! Entry point for producing a simulation's initial state.
//!
//! ```text
//! AssemblyConfig ──mode()──┬─ Import(path) ──────────→ FileImporter
//!   (conflict check)       └─ Randomized(params?) ──→ AppParams::load → RandomizedAssembler
//! ```
//!
//! Conflicting inputs are rejected before any random draw or file read. The
//! genesis timestamp is resolved next, in both modes, so the random source
//! advances identically regardless of mode.

use rand::RngCore;
use tracing::{error, info};

use crate::algorithms::resolve_timestamp;
use crate::config::{AssemblyConfig, AssemblyMode};
use crate::domain::{AppParams, AssembledGenesis, GenesisError, SimAccount};

use super::assembler::RandomizedAssembler;
use super::importer::FileImporter;

/// Selects between import and randomized assembly.
pub struct GenesisOrchestrator {
    assembler: RandomizedAssembler,
    importer: FileImporter,
}

impl GenesisOrchestrator {
    /// Orchestrator over `assembler` and `importer`.
    pub fn new(assembler: RandomizedAssembler, importer: FileImporter) -> Self {
        Self {
            assembler,
            importer,
        }
    }

    /// Randomized assembler.
    pub fn assembler(&self) -> &RandomizedAssembler {
        &self.assembler
    }

    /// Produce app state bytes, the accounts to simulate with and the chain
    /// id. `accounts` is only used for randomized assembly; imports use the
    /// accounts listed in the snapshot.
    pub fn assemble(
        &self,
        rng: &mut dyn RngCore,
        accounts: Vec<SimAccount>,
        config: &AssemblyConfig,
    ) -> Result<AssembledGenesis, GenesisError> {
        self.run(rng, accounts, config).map_err(|e| {
            error!(kind = ?e.kind(), "[Orchestrator] Genesis assembly failed: {}", e);
            e
        })
    }

    fn run(
        &self,
        rng: &mut dyn RngCore,
        accounts: Vec<SimAccount>,
        config: &AssemblyConfig,
    ) -> Result<AssembledGenesis, GenesisError> {
        let mode = config.mode()?;
        let genesis_time = resolve_timestamp(config.genesis_time, rng)?;

        match mode {
            AssemblyMode::Import(path) => {
                info!("[Orchestrator] Importing genesis from {}", path.display());
                let imported = self.importer.import_from_file(rng, path)?;
                Ok(AssembledGenesis {
                    app_state: imported.app_state,
                    accounts: imported.accounts,
                    chain_id: imported.chain_id,
                    genesis_time,
                })
            }
            AssemblyMode::Randomized(params_file) => {
                let app_params = match params_file {
                    Some(path) => {
                        info!("[Orchestrator] Randomizing genesis with params from {}", path.display());
                        AppParams::load(path)?
                    }
                    None => {
                        info!("[Orchestrator] Randomizing genesis");
                        AppParams::new()
                    }
                };
                self.assembler
                    .assemble_random(rng, accounts, genesis_time, &app_params)
            }
        }
    }
}
