//! # Hashing
//!
//! One-shot SHA-256 and Keccak-256, plus address derivation.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// 256-bit hash output.
pub type Hash = [u8; 32];

/// Hash data with SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Hash data with Keccak-256.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Derive a 20-byte address from a compressed public key.
///
/// Keccak-256 of the key, last 20 bytes.
pub fn derive_address(pubkey: &[u8; 33]) -> [u8; 20] {
    let hash = keccak256(pubkey);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_derive_address_deterministic() {
        let key = [0x02u8; 33];
        assert_eq!(derive_address(&key), derive_address(&key));
        assert_ne!(derive_address(&key), derive_address(&[0x03u8; 33]));
    }
}
