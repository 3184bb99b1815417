//! # Modules
//!
//! The standard application's modules. Each file owns one module's genesis
//! payload type, its lifecycle implementation and (where the module is
//! randomized) its generator.
//!
//! ## Generator Order
//!
//! ```text
//! accounts ─┬─→ supply
//!           └─→ staking ─┬─→ slashing   (unbonding time → max evidence age)
//!                        └─→ evidence
//! auth, bank, gov, mint, distribution: independent
//! genutil: no generator, default state only
//! ```

pub mod accounts;
pub mod auth;
pub mod bank;
pub mod distribution;
pub mod evidence;
pub mod genutil;
pub mod gov;
pub mod mint;
pub mod slashing;
pub mod staking;
pub mod supply;

use shared_types::Dec;

use crate::domain::GenesisError;
use crate::ports::{DynAppModule, DynGenerator};
use crate::registry::{TypeRegistry, TypeRegistryBuilder};

/// Decimal `value × 10^-prec`.
pub(crate) fn dec_with_prec(value: u64, prec: u32) -> Dec {
    Dec::from_atomics(u128::from(value) * 10u128.pow(18 - prec.min(18)))
}

/// Register every polymorphic payload type the standard modules use.
pub fn register_standard_types(builder: &mut TypeRegistryBuilder) -> Result<(), GenesisError> {
    evidence::register_types(builder)?;
    Ok(())
}

/// Registry with the standard types registered and sealed.
pub fn standard_registry() -> Result<TypeRegistry, GenesisError> {
    let mut builder = TypeRegistry::builder();
    register_standard_types(&mut builder)?;
    Ok(builder.build())
}

/// Lifecycle handles in init-genesis order.
pub fn standard_modules() -> Vec<DynAppModule> {
    vec![
        Box::new(accounts::AccountsModule),
        Box::new(distribution::DistributionModule),
        Box::new(staking::StakingModule),
        Box::new(auth::AuthModule),
        Box::new(bank::BankModule),
        Box::new(slashing::SlashingModule),
        Box::new(gov::GovModule),
        Box::new(mint::MintModule),
        Box::new(supply::SupplyModule),
        Box::new(genutil::GenutilModule),
        Box::new(evidence::EvidenceModule),
    ]
}

/// Generators in registration order; dependencies are declared per
/// generator and resolved by `GeneratorGraph`.
pub fn standard_generators() -> Vec<DynGenerator> {
    vec![
        Box::new(accounts::AccountsGenerator),
        Box::new(auth::AuthGenerator),
        Box::new(bank::BankGenerator),
        Box::new(supply::SupplyGenerator),
        Box::new(gov::GovGenerator),
        Box::new(mint::MintGenerator),
        Box::new(distribution::DistributionGenerator),
        Box::new(staking::StakingGenerator),
        Box::new(slashing::SlashingGenerator),
        Box::new(evidence::EvidenceGenerator),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::GeneratorGraph;
    use crate::ports::ModuleBasic;

    #[test]
    fn test_dec_with_prec() {
        assert_eq!(dec_with_prec(334, 3).to_string(), "0.334000000000000000");
        assert_eq!(dec_with_prec(7, 2), Dec::percent(7));
    }

    #[test]
    fn test_standard_generator_order() {
        let graph = GeneratorGraph::new(standard_generators()).unwrap();
        assert_eq!(
            graph.order(),
            vec![
                "accounts",
                "auth",
                "bank",
                "supply",
                "gov",
                "mint",
                "distribution",
                "staking",
                "slashing",
                "evidence"
            ]
        );
    }

    #[test]
    fn test_every_generator_has_a_module() {
        let modules: Vec<&str> = standard_modules().iter().map(|m| m.name()).collect();
        for generator in standard_generators() {
            assert!(modules.contains(&generator.module()));
        }
    }
}
