//! # Generator Port
//!
//! Contract each module implements to randomize its slice of the composite
//! state. Generators are nodes in a dependency graph: a generator that
//! consumes another module's derived value names that module in
//! [`ModuleGenesisGenerator::depends_on`] and reads the value through
//! [`GeneratorInputs::derived`].

use rand::RngCore;

use crate::domain::{
    AppParams, Derived, DerivedValues, GenesisError, GenesisTimestamp, ModuleSlot, SamplerOutput,
    SimAccount,
};
use crate::registry::TypeRegistry;

/// Read-only inputs shared by every generator in one run.
pub struct GeneratorInputs<'a> {
    /// Accounts present at genesis.
    pub accounts: &'a [SimAccount],
    /// Stake and bonding figures sampled for this run.
    pub sampler: SamplerOutput,
    /// Genesis timestamp.
    pub genesis_time: GenesisTimestamp,
    /// Per-key sampling overrides.
    pub app_params: &'a AppParams,
    /// Registry for polymorphic payloads.
    pub registry: &'a TypeRegistry,
    /// Values committed by generators that already ran.
    pub derived: &'a DerivedValues,
}

/// Randomized genesis generator for one module.
pub trait ModuleGenesisGenerator: Send + Sync {
    /// Module whose slot this generator writes.
    fn module(&self) -> &'static str;

    /// Modules whose generators must run first.
    fn depends_on(&self) -> &'static [&'static str] {
        &[]
    }

    /// Write the module's randomized genesis into `slot`.
    ///
    /// Returns a value later generators consume, or [`Derived::None`].
    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError>;
}

/// Boxed generator handle.
pub type DynGenerator = Box<dyn ModuleGenesisGenerator>;
