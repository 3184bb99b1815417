//! # Shared Crypto - Key Material for Simulation Genesis
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256, Keccak-256 | Seed expansion, address derivation |
//! | `ecdsa` | secp256k1 | Public keys and authoritative signatures |
//! | `simulation` | secp256k1 | Simulation-only credentials |
//!
//! ## Credential Separation
//!
//! A [`SimulationKeyPair`] is derived from seed bytes drawn from the
//! simulator's random source. Its signatures are [`SimulationSignature`]s,
//! which [`Secp256k1PublicKey::verify`] does not accept. Only
//! [`Secp256k1PublicKey::verify_simulated`] checks them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod simulation;

// Re-exports
pub use ecdsa::{Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use hashing::{derive_address, keccak256, sha256};
pub use simulation::{SimulationKeyPair, SimulationSignature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
