//! # Simulation Genesis (qc-sim-genesis)
//!
//! Assembles the initial composite state a blockchain simulation starts
//! from, and provides the per-module genesis lifecycle used to boot and
//! export a live application.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): composite state, accounts, params, snapshots, errors
//! - **Ports** (`ports/`): generator, lifecycle and key-value store contracts
//! - **Adapters** (`adapters/`): in-memory store
//! - **Algorithms** (`algorithms/`): parameter sampling, generator ordering
//! - **Registry** (`registry/`): interface → concrete type codec
//! - **Modules** (`modules/`): the standard modules
//! - **Service** (`service/`): manager, assembler, importer, orchestrator
//!
//! ## Modes
//!
//! | genesis file | params file | result |
//! |---|---|---|
//! | set | unset | import snapshot, chain id from file |
//! | unset | set | randomized with overrides, chain id `simulation` |
//! | unset | unset | randomized, chain id `simulation` |
//! | set | set | `ConflictingInputs` |
//!
//! Identical seed, accounts and inputs always produce byte-identical app
//! state.

pub mod adapters;
pub mod algorithms;
pub mod app;
pub mod config;
pub mod domain;
pub mod modules;
pub mod ports;
pub mod registry;
pub mod service;

// Re-export public API
pub use adapters::MemoryStore;
pub use algorithms::{random_timestamp, resolve_timestamp, sample, GeneratorGraph};
pub use app::SimulationApp;
pub use config::{AssemblyConfig, AssemblyMode, SimulationConfig};
pub use domain::{
    AppParams, AssembledGenesis, CompositeState, Derived, DerivedValues, ErrorKind, GenesisError,
    GenesisTimestamp, ModuleSlot, SamplerOutput, SimAccount, SnapshotDocument, SIMULATION_CHAIN_ID,
};
pub use modules::{standard_generators, standard_modules, standard_registry};
pub use ports::{
    AppContext, AppModuleGenesis, DynAppModule, DynGenerator, GeneratorInputs, KvStore,
    ModuleBasic, ModuleGenesisGenerator, StoreError,
};
pub use registry::{RegistryError, TypeRegistry, TypeRegistryBuilder};
pub use service::{FileImporter, GenesisOrchestrator, ImportedGenesis, ModuleManager, RandomizedAssembler};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
