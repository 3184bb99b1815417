//! # App Params
//!
//! Optional per-key overrides for generator sampling, loaded from a params
//! file. The assembler never interprets them; each generator looks up its own
//! keys and falls back to a random draw when a key is absent.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::GenesisError;

/// Parameter key → supplied value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppParams(BTreeMap<String, Value>);

impl AppParams {
    /// Empty params: every generator randomizes fully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load params from a JSON file.
    pub fn load(path: &Path) -> Result<Self, GenesisError> {
        let bytes = fs::read(path).map_err(|source| GenesisError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| GenesisError::decode(format!("params file {}", path.display()), e))
    }

    /// Set a key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Raw value of a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no keys are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode `key` if present, otherwise draw a value with `generate`.
    ///
    /// No random draw happens for keys that are supplied.
    pub fn get_or_generate<T, F>(
        &self,
        key: &str,
        rng: &mut dyn RngCore,
        generate: F,
    ) -> Result<T, GenesisError>
    where
        T: DeserializeOwned,
        F: FnOnce(&mut dyn RngCore) -> T,
    {
        match self.0.get(key) {
            Some(value) => T::deserialize(value)
                .map_err(|e| GenesisError::decode(format!("app param '{}'", key), e)),
            None => Ok(generate(rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_supplied_key_skips_generation() {
        let mut params = AppParams::new();
        params.insert("max_validators", Value::from(7u32));

        let mut rng = StdRng::seed_from_u64(1);
        let value: u32 = params
            .get_or_generate("max_validators", &mut rng, |_| unreachable!())
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_missing_key_generates() {
        let params = AppParams::new();
        let mut rng = StdRng::seed_from_u64(1);
        let value: u32 = params
            .get_or_generate("max_validators", &mut rng, |r| r.gen_range(1..=250))
            .unwrap();
        assert!((1..=250).contains(&value));
    }

    #[test]
    fn test_wrong_type_is_decode_error() {
        let mut params = AppParams::new();
        params.insert("send_enabled", Value::from("yes"));
        let mut rng = StdRng::seed_from_u64(1);
        let err = params
            .get_or_generate::<bool, _>("send_enabled", &mut rng, |_| true)
            .unwrap_err();
        assert!(matches!(err, GenesisError::Decode { ref context, .. } if context.contains("send_enabled")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppParams::load(Path::new("/nonexistent/params.json")).unwrap_err();
        assert!(matches!(err, GenesisError::FileRead { .. }));
    }
}
