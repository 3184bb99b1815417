//! # Services
//!
//! - `manager` - lifecycle fan-out over every module
//! - `assembler` - randomized composite state from the generator graph
//! - `importer` - composite state and accounts from a snapshot document
//! - `orchestrator` - mode selection and timestamp resolution

pub mod assembler;
pub mod importer;
pub mod manager;
pub mod orchestrator;

pub use assembler::RandomizedAssembler;
pub use importer::{FileImporter, ImportedGenesis, IMPORTED_KEY_SEED_LEN};
pub use manager::ModuleManager;
pub use orchestrator::GenesisOrchestrator;
