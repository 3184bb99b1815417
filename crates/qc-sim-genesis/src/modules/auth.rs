//! # Auth Module
//!
//! Transaction authentication parameters.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::ValidatorUpdate;

use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::TypeRegistry;

/// Module name.
pub const MODULE_NAME: &str = "auth";

const PARAMS_KEY: &str = "params";

/// Auth parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
    /// Maximum memo length.
    pub max_memo_characters: u64,
    /// Maximum signatures per transaction.
    pub tx_sig_limit: u64,
    /// Gas charged per transaction byte.
    pub tx_size_cost_per_byte: u64,
    /// Gas charged per ed25519 verification.
    pub sig_verify_cost_ed25519: u64,
    /// Gas charged per secp256k1 verification.
    pub sig_verify_cost_secp256k1: u64,
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost_ed25519: 590,
            sig_verify_cost_secp256k1: 1000,
        }
    }
}

/// Auth module genesis payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGenesis {
    /// Module parameters.
    pub params: AuthParams,
}

impl AuthGenesis {
    fn validate(&self) -> Result<(), GenesisError> {
        let p = &self.params;
        let fields = [
            ("max_memo_characters", p.max_memo_characters),
            ("tx_sig_limit", p.tx_sig_limit),
            ("tx_size_cost_per_byte", p.tx_size_cost_per_byte),
            ("sig_verify_cost_ed25519", p.sig_verify_cost_ed25519),
            ("sig_verify_cost_secp256k1", p.sig_verify_cost_secp256k1),
        ];
        match fields.iter().find(|(_, v)| *v == 0) {
            Some((name, _)) => Err(GenesisError::validation(
                MODULE_NAME,
                format!("{} must be positive", name),
            )),
            None => Ok(()),
        }
    }
}

/// Randomizes auth parameters.
pub struct AuthGenerator;

impl ModuleGenesisGenerator for AuthGenerator {
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
        let params = AuthParams {
            max_memo_characters: ap
                .get_or_generate("max_memo_characters", rng, |r| r.gen_range(100..200))?,
            tx_sig_limit: ap.get_or_generate("tx_sig_limit", rng, |r| r.gen_range(1..8))?,
            tx_size_cost_per_byte: ap
                .get_or_generate("tx_size_cost_per_byte", rng, |r| r.gen_range(5..11))?,
            sig_verify_cost_ed25519: ap
                .get_or_generate("sig_verify_cost_ed25519", rng, |r| r.gen_range(500..1000))?,
            sig_verify_cost_secp256k1: ap
                .get_or_generate("sig_verify_cost_secp256k1", rng, |r| r.gen_range(500..1000))?,
        };
        slot.write(&AuthGenesis { params })?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct AuthModule;

impl ModuleBasic for AuthModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, _registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        to_raw(MODULE_NAME, &AuthGenesis::default())
    }

    fn validate_genesis(&self, _registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        from_raw::<AuthGenesis>(MODULE_NAME, raw)?.validate()
    }
}

impl AppModuleGenesis for AuthModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis: AuthGenesis = from_raw(MODULE_NAME, raw)?;
        ctx.put_json(MODULE_NAME, PARAMS_KEY, &genesis.params)?;
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        _registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let params = ctx.get_json(MODULE_NAME, PARAMS_KEY)?.unwrap_or_default();
        to_raw(MODULE_NAME, &AuthGenesis { params }).map(Some)
    }
}
