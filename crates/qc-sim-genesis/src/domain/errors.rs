//! # Domain Errors
//!
//! Error taxonomy for genesis assembly, import and the module lifecycle.

use std::path::PathBuf;

use shared_crypto::CryptoError;
use thiserror::Error;

use crate::ports::StoreError;
use crate::registry::RegistryError;

/// Coarse error category, used to keep programming defects apart from user
/// input problems in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mutually exclusive or inconsistent configuration.
    Configuration,
    /// Unreadable or malformed input files.
    Input,
    /// A module generator could not produce valid state.
    Generator,
    /// Encoding failures and other defects in the program itself.
    Programming,
    /// A module rejected its genesis payload.
    Validation,
}

/// Genesis errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Both a genesis file and a params file were supplied.
    #[error("Conflicting inputs: cannot provide both genesis file {genesis_file:?} and params file {params_file:?}")]
    ConflictingInputs {
        /// Snapshot document path.
        genesis_file: PathBuf,
        /// Params file path.
        params_file: PathBuf,
    },

    /// An input file is missing or unreadable.
    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Content does not parse into the expected structure.
    #[error("Failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded (file, module, params key).
        context: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A module generator failed.
    #[error("Generator for module '{module}' failed: {reason}")]
    GeneratorFailure {
        /// Module whose generator failed.
        module: String,
        /// Failure description.
        reason: String,
    },

    /// Composite state could not be encoded.
    #[error("Failed to serialize {context}: {source}")]
    Serialization {
        /// What was being encoded.
        context: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A module rejected its genesis payload.
    #[error("Invalid genesis for module '{module}': {reason}")]
    Validation {
        /// Module that rejected the payload.
        module: String,
        /// Rejection reason.
        reason: String,
    },

    /// Type registry lookup or registration failed.
    #[error("Type registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Generator dependencies are unknown, duplicated or cyclic.
    #[error("Invalid generator graph: {0}")]
    InvalidGeneratorGraph(String),

    /// Timestamp outside the representable range.
    #[error("Invalid genesis timestamp: {0}")]
    InvalidTimestamp(i64),

    /// Credential generation failed.
    #[error("Credential generation failed: {0}")]
    Crypto(#[from] CryptoError),

    /// Live application store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl GenesisError {
    /// Build a generator failure for `module`.
    pub fn generator(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GeneratorFailure {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Build a validation failure for `module`.
    pub fn validation(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Build a decode failure.
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Build a serialization failure.
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConflictingInputs { .. } | Self::InvalidGeneratorGraph(_) => {
                ErrorKind::Configuration
            }
            Self::FileRead { .. } | Self::Decode { .. } | Self::InvalidTimestamp(_) => {
                ErrorKind::Input
            }
            Self::GeneratorFailure { .. } | Self::Crypto(_) => ErrorKind::Generator,
            Self::Serialization { .. } | Self::Store(_) => ErrorKind::Programming,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Registry(err) => match err {
                RegistryError::UnregisteredType { .. } | RegistryError::MalformedEnvelope { .. } => {
                    ErrorKind::Input
                }
                RegistryError::DuplicateName { .. } => ErrorKind::Configuration,
                RegistryError::UnregisteredConcrete { .. }
                | RegistryError::UnknownCapability { .. } => ErrorKind::Programming,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_inputs_display() {
        let err = GenesisError::ConflictingInputs {
            genesis_file: "genesis.json".into(),
            params_file: "params.json".into(),
        };
        let text = err.to_string();
        assert!(text.contains("genesis.json"));
        assert!(text.contains("params.json"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_generator_failure_names_module() {
        let err = GenesisError::generator("slashing", "missing unbonding time");
        assert!(err.to_string().contains("slashing"));
        assert_eq!(err.kind(), ErrorKind::Generator);
    }

    #[test]
    fn test_serialization_is_programming_error() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = GenesisError::serialization("app state", source);
        assert_eq!(err.kind(), ErrorKind::Programming);
    }

    #[test]
    fn test_unregistered_type_is_input_error() {
        let err = GenesisError::from(RegistryError::UnregisteredType {
            capability: "Evidence".to_string(),
            name: "unknown/Type".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Input);
    }
}
