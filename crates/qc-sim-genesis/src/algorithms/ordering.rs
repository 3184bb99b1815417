//! # Generator Ordering
//!
//! Topological order over module generators. Ties are broken by
//! registration order, so the same generator list always yields the same
//! order.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::GenesisError;
use crate::ports::{DynGenerator, ModuleGenesisGenerator};

/// Generators in invocation order.
pub struct GeneratorGraph {
    ordered: Vec<DynGenerator>,
}

impl GeneratorGraph {
    /// Sort `generators` so every generator runs after its dependencies.
    ///
    /// Rejects duplicate modules, dependencies without a generator, and
    /// cycles.
    pub fn new(generators: Vec<DynGenerator>) -> Result<Self, GenesisError> {
        let mut known = HashSet::new();
        for generator in &generators {
            if !known.insert(generator.module()) {
                return Err(GenesisError::InvalidGeneratorGraph(format!(
                    "duplicate generator for module '{}'",
                    generator.module()
                )));
            }
        }
        for generator in &generators {
            if let Some(dep) = generator.depends_on().iter().find(|d| !known.contains(*d)) {
                return Err(GenesisError::InvalidGeneratorGraph(format!(
                    "module '{}' depends on '{}', which has no generator",
                    generator.module(),
                    dep
                )));
            }
        }

        let total = generators.len();
        let mut pending: Vec<Option<DynGenerator>> = generators.into_iter().map(Some).collect();
        let mut placed: HashSet<&'static str> = HashSet::with_capacity(total);
        let mut ordered = Vec::with_capacity(total);

        while ordered.len() < total {
            let ready = pending.iter().position(|slot| {
                slot.as_ref().is_some_and(|g| {
                    g.depends_on().iter().all(|dep| placed.contains(dep))
                })
            });
            let Some(generator) = ready.and_then(|index| pending[index].take()) else {
                let stuck: Vec<&str> = pending.iter().flatten().map(|g| g.module()).collect();
                return Err(GenesisError::InvalidGeneratorGraph(format!(
                    "dependency cycle among {:?}",
                    stuck
                )));
            };
            placed.insert(generator.module());
            ordered.push(generator);
        }

        let graph = Self { ordered };
        debug!("[Ordering] Generator order: {:?}", graph.order());
        Ok(graph)
    }

    /// Keep the caller's order verbatim.
    pub fn with_fixed_order(generators: Vec<DynGenerator>) -> Self {
        Self {
            ordered: generators,
        }
    }

    /// Module names in invocation order.
    pub fn order(&self) -> Vec<&'static str> {
        self.ordered.iter().map(|g| g.module()).collect()
    }

    /// Generators in invocation order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ModuleGenesisGenerator> {
        self.ordered.iter().map(|g| g.as_ref())
    }

    /// Number of generators.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Derived, ModuleSlot};
    use crate::ports::GeneratorInputs;
    use rand::RngCore;

    struct Node {
        name: &'static str,
        deps: &'static [&'static str],
    }

    impl ModuleGenesisGenerator for Node {
        fn module(&self) -> &'static str {
            self.name
        }
        fn depends_on(&self) -> &'static [&'static str] {
            self.deps
        }
        fn generate(
            &self,
            _rng: &mut dyn RngCore,
            _inputs: &GeneratorInputs<'_>,
            _slot: &mut ModuleSlot<'_>,
        ) -> Result<Derived, GenesisError> {
            Ok(Derived::None)
        }
    }

    fn node(name: &'static str, deps: &'static [&'static str]) -> DynGenerator {
        Box::new(Node { name, deps })
    }

    #[test]
    fn test_dependencies_run_first() {
        let graph = GeneratorGraph::new(vec![
            node("slashing", &["staking"]),
            node("bank", &[]),
            node("staking", &["accounts"]),
            node("accounts", &[]),
        ])
        .unwrap();
        assert_eq!(graph.order(), vec!["bank", "accounts", "staking", "slashing"]);
    }

    #[test]
    fn test_registration_order_kept_without_deps() {
        let graph = GeneratorGraph::new(vec![node("b", &[]), node("a", &[]), node("c", &[])]).unwrap();
        assert_eq!(graph.order(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_cycle_rejected() {
        let err = GeneratorGraph::new(vec![node("a", &["b"]), node("b", &["a"])])
            .err()
            .unwrap();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let err = GeneratorGraph::new(vec![node("slashing", &["staking"])])
            .err()
            .unwrap();
        assert!(matches!(err, GenesisError::InvalidGeneratorGraph(_)));
    }

    #[test]
    fn test_duplicate_rejected() {
        assert!(GeneratorGraph::new(vec![node("a", &[]), node("a", &[])]).is_err());
    }

    #[test]
    fn test_fixed_order_verbatim() {
        let graph = GeneratorGraph::with_fixed_order(vec![
            node("slashing", &["staking"]),
            node("staking", &[]),
        ]);
        assert_eq!(graph.order(), vec!["slashing", "staking"]);
        assert_eq!(graph.len(), 2);
    }
}
