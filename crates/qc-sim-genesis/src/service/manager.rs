//! # Module Manager
//!
//! Fans the genesis lifecycle out over every module, in init order.

use std::collections::HashSet;

use shared_types::ValidatorUpdate;
use tracing::{debug, info, warn};

use crate::domain::{CompositeState, GenesisError};
use crate::ports::{AppContext, AppModuleGenesis, DynAppModule, ModuleBasic};
use crate::registry::TypeRegistry;

/// Ordered set of module lifecycle handles.
pub struct ModuleManager {
    modules: Vec<DynAppModule>,
}

impl ModuleManager {
    /// Manager over `modules`, initialized in the given order. Module names
    /// must be unique.
    pub fn new(modules: Vec<DynAppModule>) -> Result<Self, GenesisError> {
        let mut seen = HashSet::with_capacity(modules.len());
        for module in &modules {
            if !seen.insert(module.name()) {
                return Err(GenesisError::validation(
                    module.name(),
                    "module registered twice with the manager",
                ));
            }
        }
        Ok(Self { modules })
    }

    /// Module names in init order.
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Lifecycle handle for `name`.
    pub fn module(&self, name: &str) -> Option<&dyn AppModuleGenesis> {
        self.modules
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
    }

    /// Every module's default payload.
    pub fn default_genesis(&self, registry: &TypeRegistry) -> Result<CompositeState, GenesisError> {
        let mut state = CompositeState::new();
        for module in &self.modules {
            state.insert_raw(module.name(), module.default_genesis(registry)?);
        }
        Ok(state)
    }

    /// Validate every module's entry, returning the first failure. Missing
    /// entries are validated as their default.
    pub fn validate_genesis(
        &self,
        registry: &TypeRegistry,
        state: &CompositeState,
    ) -> Result<(), GenesisError> {
        for module in &self.modules {
            match state.get(module.name()) {
                Some(raw) => module.validate_genesis(registry, raw)?,
                None => module.validate_genesis(registry, &module.default_genesis(registry)?)?,
            }
        }
        for name in state.modules() {
            if self.module(name).is_none() {
                warn!("[Manager] app state entry '{}' has no module", name);
            }
        }
        Ok(())
    }

    /// Apply `state` to the live application. At most one module may report
    /// validator updates.
    pub fn init_genesis(
        &self,
        ctx: &AppContext,
        registry: &TypeRegistry,
        state: &CompositeState,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let mut updates: Option<(&'static str, Vec<ValidatorUpdate>)> = None;

        for module in &self.modules {
            let module_updates = match state.get(module.name()) {
                Some(raw) => module.init_genesis(ctx, registry, raw)?,
                None => {
                    debug!("[Manager] {} missing from app state, using default", module.name());
                    module.init_genesis(ctx, registry, &module.default_genesis(registry)?)?
                }
            };
            if module_updates.is_empty() {
                continue;
            }
            if let Some((owner, _)) = &updates {
                return Err(GenesisError::validation(
                    module.name(),
                    format!("validator updates already reported by module '{}'", owner),
                ));
            }
            updates = Some((module.name(), module_updates));
        }

        let updates = updates.map(|(_, u)| u).unwrap_or_default();
        info!(
            "[Manager] Genesis initialized on {} with {} validator updates",
            ctx.chain_id,
            updates.len()
        );
        Ok(updates)
    }

    /// Export every module with exportable state.
    pub fn export_genesis(
        &self,
        ctx: &AppContext,
        registry: &TypeRegistry,
    ) -> Result<CompositeState, GenesisError> {
        let mut state = CompositeState::new();
        for module in &self.modules {
            if let Some(raw) = module.export_genesis(ctx, registry)? {
                state.insert_raw(module.name(), raw);
            }
        }
        Ok(state)
    }
}
