//! # Simulation Application
//!
//! Wires the registry, module manager, generator graph and orchestrator
//! into one handle, and boots a live application from an assembled genesis.

use std::sync::Arc;

use shared_types::ValidatorUpdate;
use tracing::info;

use crate::algorithms::GeneratorGraph;
use crate::domain::{AssembledGenesis, CompositeState, GenesisError};
use crate::modules::{standard_generators, standard_modules, standard_registry};
use crate::ports::{AppContext, DynAppModule, DynGenerator, KvStore};
use crate::registry::TypeRegistry;
use crate::service::{FileImporter, GenesisOrchestrator, ModuleManager, RandomizedAssembler};

/// Registry, modules and orchestrator of one application.
pub struct SimulationApp {
    registry: Arc<TypeRegistry>,
    manager: Arc<ModuleManager>,
    orchestrator: GenesisOrchestrator,
}

impl SimulationApp {
    /// The standard module set.
    pub fn standard() -> Result<Self, GenesisError> {
        Self::new(standard_registry()?, standard_modules(), standard_generators())
    }

    /// Application over custom modules. Generators are ordered by their
    /// declared dependencies.
    pub fn new(
        registry: TypeRegistry,
        modules: Vec<DynAppModule>,
        generators: Vec<DynGenerator>,
    ) -> Result<Self, GenesisError> {
        Self::with_graph(registry, modules, GeneratorGraph::new(generators)?)
    }

    /// Application with an already built generator graph.
    pub fn with_graph(
        registry: TypeRegistry,
        modules: Vec<DynAppModule>,
        graph: GeneratorGraph,
    ) -> Result<Self, GenesisError> {
        let registry = Arc::new(registry);
        let manager = Arc::new(ModuleManager::new(modules)?);
        info!(
            "[App] {} modules, generator order: {}",
            manager.module_names().len(),
            graph.order().join(" → ")
        );
        let assembler = RandomizedAssembler::new(Arc::clone(&registry), Arc::clone(&manager), graph);
        Ok(Self {
            registry,
            manager,
            orchestrator: GenesisOrchestrator::new(assembler, FileImporter::new()),
        })
    }

    /// Shared type registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Module lifecycle manager.
    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }

    /// Genesis orchestrator.
    pub fn orchestrator(&self) -> &GenesisOrchestrator {
        &self.orchestrator
    }

    /// Decode and validate an assembled composite state.
    pub fn validate(&self, genesis: &AssembledGenesis) -> Result<CompositeState, GenesisError> {
        let state = CompositeState::from_bytes(&genesis.app_state)?;
        self.manager.validate_genesis(&self.registry, &state)?;
        Ok(state)
    }

    /// Validate `genesis` and initialize it into `store`.
    pub fn boot(
        &self,
        genesis: &AssembledGenesis,
        store: Arc<dyn KvStore>,
    ) -> Result<(AppContext, Vec<ValidatorUpdate>), GenesisError> {
        let state = self.validate(genesis)?;
        let ctx = AppContext::new(store, genesis.chain_id.clone(), genesis.genesis_time);
        let updates = self.manager.init_genesis(&ctx, &self.registry, &state)?;
        Ok((ctx, updates))
    }

    /// Export the live state behind `ctx`.
    pub fn export(&self, ctx: &AppContext) -> Result<CompositeState, GenesisError> {
        self.manager.export_genesis(ctx, &self.registry)
    }
}
