//! # Evidence Module
//!
//! Misbehaviour evidence carried in genesis. Evidence is polymorphic: any
//! module may define its own evidence kind, implement [`Evidence`] for it
//! and register it with [`register_evidence_type`]. Genesis payloads store
//! each record as a registry envelope.
//!
//! ```json
//! {"params": {"max_evidence_age": 3600},
//!  "evidence": [{"type": "qc/Equivocation", "value": {...}}]}
//! ```

use std::collections::HashSet;
use std::fmt::Debug;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_with::{serde_as, DurationSeconds};
use shared_crypto::sha256;
use shared_types::{Address, Hash, ValidatorUpdate, POWER_REDUCTION};

use crate::domain::{from_raw, to_raw, Derived, GenesisError, ModuleSlot};
use crate::ports::{AppContext, AppModuleGenesis, GeneratorInputs, ModuleBasic, ModuleGenesisGenerator};
use crate::registry::{AsAny, RegistryError, TypeRegistry, TypeRegistryBuilder, Upcast};

/// Module name.
pub const MODULE_NAME: &str = "evidence";

/// Interface name under which evidence kinds are registered.
pub const EVIDENCE_INTERFACE: &str = "Evidence";

/// Registered name of [`Equivocation`].
pub const EQUIVOCATION_TYPE: &str = "qc/Equivocation";

const PARAMS_KEY: &str = "params";
const RECORD_PREFIX: &str = "record/";

/// Proof that a validator misbehaved.
pub trait Evidence: AsAny + Debug + Send + Sync {
    /// Handler route.
    fn route(&self) -> &'static str;

    /// Evidence kind.
    fn evidence_type(&self) -> &'static str;

    /// Height at which the misbehaviour happened.
    fn height(&self) -> i64;

    /// Content hash, unique per record.
    fn hash(&self) -> Hash;

    /// Stateless sanity check.
    fn validate_basic(&self) -> Result<(), String>;
}

impl<T: Evidence> Upcast<dyn Evidence> for T {
    fn upcast(self: Box<Self>) -> Box<dyn Evidence> {
        self
    }
}

/// Register an evidence kind so it can appear in genesis payloads.
pub fn register_evidence_type<T>(
    builder: &mut TypeRegistryBuilder,
    name: &str,
) -> Result<(), RegistryError>
where
    T: Evidence + Serialize + DeserializeOwned,
{
    builder
        .register_interface::<dyn Evidence>(EVIDENCE_INTERFACE)
        .register_concrete::<dyn Evidence, T>(name)?;
    Ok(())
}

/// Register the evidence interface and the built-in evidence kinds.
pub fn register_types(builder: &mut TypeRegistryBuilder) -> Result<(), RegistryError> {
    register_evidence_type::<Equivocation>(builder, EQUIVOCATION_TYPE)
}

/// A validator signed two conflicting blocks at the same height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equivocation {
    /// Height of the conflicting votes.
    pub height: i64,
    /// Time of the conflicting votes.
    pub time: DateTime<Utc>,
    /// Validator power at that height.
    pub power: i64,
    /// Offending validator.
    pub consensus_address: Address,
}

impl Evidence for Equivocation {
    fn route(&self) -> &'static str {
        MODULE_NAME
    }

    fn evidence_type(&self) -> &'static str {
        "equivocation"
    }

    fn height(&self) -> i64 {
        self.height
    }

    fn hash(&self) -> Hash {
        let mut bytes = Vec::with_capacity(44);
        bytes.extend_from_slice(&self.height.to_be_bytes());
        bytes.extend_from_slice(&self.time.timestamp().to_be_bytes());
        bytes.extend_from_slice(&self.power.to_be_bytes());
        bytes.extend_from_slice(self.consensus_address.as_bytes());
        sha256(&bytes)
    }

    fn validate_basic(&self) -> Result<(), String> {
        if self.height < 1 {
            return Err(format!("invalid equivocation height: {}", self.height));
        }
        if self.power < 1 {
            return Err(format!("invalid equivocation validator power: {}", self.power));
        }
        Ok(())
    }
}

/// Evidence parameters.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceParams {
    /// Oldest evidence still accepted.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub max_evidence_age: Duration,
}

impl Default for EvidenceParams {
    fn default() -> Self {
        Self {
            max_evidence_age: Duration::from_secs(60 * 2 * 60 * 24 * 3),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct EncodedGenesis {
    params: EvidenceParams,
    #[serde(default)]
    evidence: Vec<Box<RawValue>>,
}

/// Evidence module genesis payload, with records decoded.
#[derive(Debug, Default)]
pub struct EvidenceGenesis {
    /// Module parameters.
    pub params: EvidenceParams,
    /// Evidence records.
    pub evidence: Vec<Box<dyn Evidence>>,
}

impl EvidenceGenesis {
    /// Decode a payload, resolving each record through `registry`.
    pub fn decode(registry: &TypeRegistry, raw: &RawValue) -> Result<Self, GenesisError> {
        let encoded: EncodedGenesis = from_raw(MODULE_NAME, raw)?;
        let evidence = encoded
            .evidence
            .iter()
            .map(|record| registry.decode::<dyn Evidence>(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            params: encoded.params,
            evidence,
        })
    }

    /// Encode with each record wrapped in a registry envelope.
    pub fn encode(&self, registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        let evidence = self
            .evidence
            .iter()
            .map(|record| registry.encode::<dyn Evidence>(record.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        to_raw(
            MODULE_NAME,
            &EncodedGenesis {
                params: self.params.clone(),
                evidence,
            },
        )
    }

    fn validate(&self) -> Result<(), GenesisError> {
        if self.params.max_evidence_age.is_zero() {
            return Err(GenesisError::validation(MODULE_NAME, "max evidence age must be positive"));
        }
        let mut seen = HashSet::with_capacity(self.evidence.len());
        for record in &self.evidence {
            record
                .validate_basic()
                .map_err(|reason| GenesisError::validation(MODULE_NAME, reason))?;
            if !seen.insert(record.hash()) {
                return Err(GenesisError::validation(
                    MODULE_NAME,
                    format!("duplicate evidence {}", hex::encode(record.hash())),
                ));
            }
        }
        Ok(())
    }
}

/// Seeds 0 to 2 equivocations against initially bonded validators.
pub struct EvidenceGenerator;

impl ModuleGenesisGenerator for EvidenceGenerator {
    fn module(&self) -> &'static str {
        MODULE_NAME
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &[super::staking::MODULE_NAME]
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        inputs: &GeneratorInputs<'_>,
        slot: &mut ModuleSlot<'_>,
    ) -> Result<Derived, GenesisError> {
        let max_evidence_age = inputs.derived.unbonding_time(MODULE_NAME)?;
        let bonded = inputs.sampler.num_initially_bonded.min(inputs.accounts.len());
        let power = i64::try_from(inputs.sampler.initial_stake / POWER_REDUCTION).unwrap_or(i64::MAX);

        let mut evidence: Vec<Box<dyn Evidence>> = Vec::new();
        // Powerless validators cannot equivocate meaningfully.
        if bonded > 0 && power > 0 {
            let count = rng.gen_range(0..=2);
            let mut seen = HashSet::new();
            for _ in 0..count {
                let record = Equivocation {
                    height: rng.gen_range(1..=1_000),
                    time: inputs.genesis_time,
                    power,
                    consensus_address: inputs.accounts[rng.gen_range(0..bonded)].address,
                };
                if seen.insert(record.hash()) {
                    evidence.push(Box::new(record));
                }
            }
        }

        let genesis = EvidenceGenesis {
            params: EvidenceParams { max_evidence_age },
            evidence,
        };
        slot.write(&genesis.encode(inputs.registry)?)?;
        Ok(Derived::None)
    }
}

/// Lifecycle handle.
pub struct EvidenceModule;

impl ModuleBasic for EvidenceModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn default_genesis(&self, registry: &TypeRegistry) -> Result<Box<RawValue>, GenesisError> {
        EvidenceGenesis::default().encode(registry)
    }

    fn validate_genesis(&self, registry: &TypeRegistry, raw: &RawValue) -> Result<(), GenesisError> {
        EvidenceGenesis::decode(registry, raw)?.validate()
    }
}

impl AppModuleGenesis for EvidenceModule {
    fn init_genesis(
        &self,
        ctx: &AppContext,
        registry: &TypeRegistry,
        raw: &RawValue,
    ) -> Result<Vec<ValidatorUpdate>, GenesisError> {
        let genesis = EvidenceGenesis::decode(registry, raw)?;
        genesis.validate()?;
        ctx.put_json(MODULE_NAME, PARAMS_KEY, &genesis.params)?;
        for record in &genesis.evidence {
            let envelope = registry.encode::<dyn Evidence>(record.as_ref())?;
            ctx.put_json(
                MODULE_NAME,
                &format!("{}{}", RECORD_PREFIX, hex::encode(record.hash())),
                &envelope,
            )?;
        }
        Ok(Vec::new())
    }

    fn export_genesis(
        &self,
        ctx: &AppContext,
        registry: &TypeRegistry,
    ) -> Result<Option<Box<RawValue>>, GenesisError> {
        let envelopes: Vec<Box<RawValue>> = ctx.scan_json(MODULE_NAME, RECORD_PREFIX)?;
        let evidence = envelopes
            .iter()
            .map(|raw| registry.decode::<dyn Evidence>(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let genesis = EvidenceGenesis {
            params: ctx.get_json(MODULE_NAME, PARAMS_KEY)?.unwrap_or_default(),
            evidence,
        };
        genesis.encode(registry).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize)]
    struct Downtime {
        height: i64,
        validator: Address,
    }

    impl Evidence for Downtime {
        fn route(&self) -> &'static str {
            "slashing"
        }

        fn evidence_type(&self) -> &'static str {
            "downtime"
        }

        fn height(&self) -> i64 {
            self.height
        }

        fn hash(&self) -> Hash {
            sha256(&self.height.to_be_bytes())
        }

        fn validate_basic(&self) -> Result<(), String> {
            Ok(())
        }
    }

    fn equivocation(height: i64) -> Equivocation {
        Equivocation {
            height,
            time: Utc.timestamp_opt(1_000, 0).single().unwrap(),
            power: 10,
            consensus_address: Address::new([7; 20]),
        }
    }

    fn registry() -> TypeRegistry {
        let mut builder = TypeRegistry::builder();
        register_types(&mut builder).unwrap();
        register_evidence_type::<Downtime>(&mut builder, "test/Downtime").unwrap();
        builder.build()
    }

    #[test]
    fn test_heterogeneous_records_roundtrip() {
        let registry = registry();
        let genesis = EvidenceGenesis {
            params: EvidenceParams::default(),
            evidence: vec![
                Box::new(equivocation(5)),
                Box::new(Downtime {
                    height: 9,
                    validator: Address::new([1; 20]),
                }),
            ],
        };
        let raw = genesis.encode(&registry).unwrap();
        assert!(raw.get().contains(r#""type":"qc/Equivocation""#));
        assert!(raw.get().contains(r#""type":"test/Downtime""#));

        let back = EvidenceGenesis::decode(&registry, &raw).unwrap();
        let kinds: Vec<_> = back.evidence.iter().map(|e| e.evidence_type()).collect();
        assert_eq!(kinds, vec!["equivocation", "downtime"]);
        assert_eq!(back.evidence[1].route(), "slashing");
        assert_eq!(back.evidence[0].height(), 5);
    }

    #[test]
    fn test_unregistered_kind_rejected() {
        let mut builder = TypeRegistry::builder();
        register_types(&mut builder).unwrap();
        let registry = builder.build();

        let raw = RawValue::from_string(
            r#"{"params":{"max_evidence_age":60},"evidence":[{"type":"test/Downtime","value":{}}]}"#
                .to_string(),
        )
        .unwrap();
        let err = EvidenceModule.validate_genesis(&registry, &raw).unwrap_err();
        assert!(matches!(
            err,
            GenesisError::Registry(RegistryError::UnregisteredType { .. })
        ));
    }

    #[test]
    fn test_duplicate_evidence_rejected() {
        let registry = registry();
        let genesis = EvidenceGenesis {
            params: EvidenceParams::default(),
            evidence: vec![Box::new(equivocation(3)), Box::new(equivocation(3))],
        };
        let raw = genesis.encode(&registry).unwrap();
        assert!(EvidenceModule.validate_genesis(&registry, &raw).is_err());
    }

    #[test]
    fn test_init_then_export() {
        let registry = registry();
        let genesis = EvidenceGenesis {
            params: EvidenceParams {
                max_evidence_age: Duration::from_secs(120),
            },
            evidence: vec![Box::new(equivocation(4))],
        };
        let raw = genesis.encode(&registry).unwrap();
        let ctx = AppContext::new(Arc::new(MemoryStore::new()), "simulation", Utc::now());

        let updates = EvidenceModule.init_genesis(&ctx, &registry, &raw).unwrap();
        assert!(updates.is_empty());

        let exported = EvidenceModule.export_genesis(&ctx, &registry).unwrap().unwrap();
        assert_eq!(exported.get(), raw.get());
    }
}
