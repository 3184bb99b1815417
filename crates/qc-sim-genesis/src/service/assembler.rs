//! # Randomized Assembler
//!
//! Builds a composite state by running every module generator once, in
//! dependency order, against a shared random source.
//!
//! ```text
//! defaults ──→ sample(stake, bonded) ──→ accounts → … → staking ──UnbondingTime──→ slashing → evidence
//!                                                                                      │
//!                                                                   CompositeState::to_bytes()
//! ```

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::algorithms::{sample, GeneratorGraph};
use crate::domain::{
    AppParams, AssembledGenesis, DerivedValues, GenesisError, GenesisTimestamp, SimAccount,
    SIMULATION_CHAIN_ID,
};
use crate::ports::{GeneratorInputs, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

use super::manager::ModuleManager;

/// Randomized genesis from the generator graph.
pub struct RandomizedAssembler {
    registry: Arc<TypeRegistry>,
    manager: Arc<ModuleManager>,
    generators: GeneratorGraph,
}

impl RandomizedAssembler {
    /// Assembler seeding each run with `manager`'s default state.
    pub fn new(
        registry: Arc<TypeRegistry>,
        manager: Arc<ModuleManager>,
        generators: GeneratorGraph,
    ) -> Self {
        Self {
            registry,
            manager,
            generators,
        }
    }

    /// Generator invocation order.
    pub fn order(&self) -> Vec<&'static str> {
        self.generators.order()
    }

    /// One randomized assembly. The chain id is always
    /// [`SIMULATION_CHAIN_ID`] and `accounts` are returned unchanged.
    pub fn assemble_random(
        &self,
        rng: &mut dyn RngCore,
        accounts: Vec<SimAccount>,
        genesis_time: GenesisTimestamp,
        app_params: &AppParams,
    ) -> Result<AssembledGenesis, GenesisError> {
        let started = Instant::now();
        let mut state = self.manager.default_genesis(&self.registry)?;
        let sampler = sample(rng, accounts.len());
        let mut derived = DerivedValues::default();

        for generator in self.generators.iter() {
            let module = generator.module();
            let inputs = GeneratorInputs {
                accounts: &accounts,
                sampler,
                genesis_time,
                app_params,
                registry: &self.registry,
                derived: &derived,
            };
            let output = generator.generate(rng, &inputs, &mut state.slot(module))?;
            derived.record(output);
            debug!("[Assembler] {} genesis generated", module);
        }

        let app_state = state.to_bytes()?;
        info!(
            "[Assembler] Randomized genesis: {} modules, {} accounts, {} bytes in {:?}",
            state.len(),
            accounts.len(),
            app_state.len(),
            started.elapsed()
        );

        Ok(AssembledGenesis {
            app_state,
            accounts,
            chain_id: SIMULATION_CHAIN_ID.to_string(),
            genesis_time,
        })
    }

    /// One independent assembly per seed on the rayon pool. Results are in
    /// seed order.
    pub fn assemble_trials(
        &self,
        seeds: &[u64],
        accounts: &[SimAccount],
        genesis_time: GenesisTimestamp,
        app_params: &AppParams,
    ) -> Vec<Result<AssembledGenesis, GenesisError>> {
        info!("[Assembler] Running {} parallel trials", seeds.len());
        seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                self.assemble_random(&mut rng, accounts.to_vec(), genesis_time, app_params)
            })
            .collect()
    }
}
