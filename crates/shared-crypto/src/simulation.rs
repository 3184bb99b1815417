//! # Simulation-Only Credentials
//!
//! Key pairs regenerated for accounts whose real keys are unknown (imported
//! snapshots) or that only exist inside a simulation run. They let the
//! simulator act as an address. They never carry signing authority: the
//! signature type they produce is not accepted by authoritative
//! verification.

use std::fmt;

use k256::ecdsa::{signature::Signer, Signature, SigningKey};
use zeroize::Zeroize;

use crate::ecdsa::{verify_raw, Secp256k1PublicKey};
use crate::hashing::sha256;
use crate::CryptoError;

/// Rehash attempts before giving up on a seed.
const MAX_DERIVATION_ROUNDS: usize = 8;

/// Signature produced by a [`SimulationKeyPair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationSignature([u8; 64]);

impl SimulationSignature {
    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Non-authoritative secp256k1 key pair derived from seed bytes.
pub struct SimulationKeyPair {
    signing_key: SigningKey,
}

impl SimulationKeyPair {
    /// Derive a key pair from arbitrary seed bytes.
    ///
    /// The secret scalar is SHA-256 of the seed, rehashed if it falls outside
    /// the curve order.
    pub fn from_seed(seed: &[u8]) -> Result<Self, CryptoError> {
        let mut digest = sha256(seed);
        for _ in 0..MAX_DERIVATION_ROUNDS {
            if let Ok(signing_key) = SigningKey::from_bytes((&digest).into()) {
                digest.zeroize();
                return Ok(Self { signing_key });
            }
            digest = sha256(&digest);
        }
        digest.zeroize();
        Err(CryptoError::KeyGenerationFailed(
            "seed did not produce a valid secp256k1 scalar".to_string(),
        ))
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        let sec1_bytes = self.signing_key.verifying_key().to_sec1_bytes();
        // Compressed SEC1 encoding is always 33 bytes
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(&sec1_bytes[..33]);
        Secp256k1PublicKey(bytes)
    }

    /// Sign a simulated transaction (deterministic RFC 6979).
    pub fn sign(&self, message: &[u8]) -> SimulationSignature {
        let sig: Signature = self.signing_key.sign(message);
        SimulationSignature(sig.to_bytes().into())
    }
}

impl fmt::Debug for SimulationKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl Secp256k1PublicKey {
    /// Verify a signature produced by a simulation credential.
    pub fn verify_simulated(
        &self,
        message: &[u8],
        signature: &SimulationSignature,
    ) -> Result<(), CryptoError> {
        verify_raw(&self.0, message, &signature.0)
    }
}
