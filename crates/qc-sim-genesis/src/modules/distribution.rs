//! # Distribution Module
//!
//! Fee distribution: community tax and proposer rewards.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::{Dec, ValidatorUpdate};

use super::dec_with_prec;
use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "distribution";

/// Distribution module genesis payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionGenesis {
    /// Share of fees sent to the community pool.
    pub community_tax: Dec,
    /// Base reward for the block proposer.
    pub base_proposer_reward: Dec,
    /// Bonus reward scaled by precommits included.
    pub bonus_proposer_reward: Dec,
    /// Whether delegators may set a withdraw address.
    pub withdraw_addr_enabled: bool,
}

impl Default for DistributionGenesis {
    fn default() -> Self {
        Self {
            community_tax: Dec::percent(2),
            base_proposer_reward: Dec::percent(1),
            bonus_proposer_reward: Dec::percent(4),
            withdraw_addr_enabled: true,
        }
    }
}

impl DistributionGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        let total = self
            .community_tax
            .checked_add(self.base_proposer_reward)
            .and_then(|d| d.checked_add(self.bonus_proposer_reward))
            .ok_or_else(|| GenesisError::validation(MODULE_NAME, "reward shares overflow"))?;
        if total > Dec::ONE {
            return Err(GenesisError::validation(
                MODULE_NAME,
                format!("community tax and proposer rewards exceed one: {}", total),
            ));
        }
        Ok(())
    }
}

/// `0.01 + [0, 0.30)`, as used for tax and reward draws.
fn one_percent_plus(r: &mut dyn RngCore) -> Dec {
    dec_with_prec(1 + r.gen_range(0..30), 2)
}

/// Randomizes tax and reward shares.
pub struct DistributionGenerator;

impl ModuleGenesisGenerator for DistributionGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let ap = inputs.app_params;
        let genesis = DistributionGenesis {
            community_tax: ap.get_or_generate("community_tax", rng, one_percent_plus)?,
            base_proposer_reward: ap.get_or_generate("base_proposer_reward", rng, one_percent_plus)?,
            bonus_proposer_reward: ap.get_or_generate("bonus_proposer_reward", rng, one_percent_plus)?,
            withdraw_addr_enabled: ap
                .get_or_generate("withdraw_addr_enabled", rng, |r| r.gen_range(0..101) <= 95)?,
        };
        slot.write(&genesis)?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct DistributionModule;

impl ModuleBasic for DistributionModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &DistributionGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<DistributionGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for DistributionModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: DistributionGenesis = from_raw(MODULE_NAME, raw)?;
        genesis.validate()?;
        ctx.put_json(MODULE_NAME, "params", &genesis)?;
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let genesis: DistributionGenesis = ctx.get_json(MODULE_NAME, "params")?.unwrap_or_default();
        to_raw(MODULE_NAME, &genesis).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draw_range() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let d = one_percent_plus(&mut rng);
            assert!(d >= Dec::percent(1) && d < Dec::percent(31));
        }
    }

    #[test]
    fn test_excessive_rewards_rejected() {
        let genesis = DistributionGenesis {
            community_tax: Dec::percent(50),
            base_proposer_reward: Dec::percent(40),
            bonus_proposer_reward: Dec::percent(20),
            withdraw_addr_enabled: true,
        };
        assert!(genesis.validate().is_err());
        DistributionGenesis::default().validate().unwrap();
    }
}
