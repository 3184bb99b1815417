//! # Registry Errors

use thiserror::Error;

/// Type registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Decoded payload names a type nobody registered.
    #[error("Unregistered type '{name}' for interface {capability}")]
    UnregisteredType {
        /// Interface name.
        capability: String,
        /// Type name found in the payload.
        name: String,
    },

    /// Encoding a concrete value whose type was never registered.
    #[error("Concrete type {type_name} is not registered for interface {capability}")]
    UnregisteredConcrete {
        /// Interface name.
        capability: String,
        /// Rust type name of the value.
        type_name: String,
    },

    /// Name already taken within the interface.
    #[error("Type name '{name}' already registered for interface {capability}")]
    DuplicateName {
        /// Interface name.
        capability: String,
        /// Conflicting type name.
        name: String,
    },

    /// Interface was never registered.
    #[error("Unknown interface {capability}")]
    UnknownCapability {
        /// Rust type name of the interface.
        capability: String,
    },

    /// Payload is not a `{"type", "value"}` envelope or its value is malformed.
    #[error("Malformed {capability} payload: {reason}")]
    MalformedEnvelope {
        /// Interface name.
        capability: String,
        /// Parse failure.
        reason: String,
    },
}
