//! # Core Entities
//!
//! Identity and amount types that appear inside every module's genesis
//! payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{serde_as, Bytes, DisplayFromStr};

use crate::errors::TypesError;

/// A 32-byte hash (SHA-256 or Keccak-256).
pub type Hash = [u8; 32];

/// Compressed secp256k1 public key bytes.
pub type PublicKeyBytes = [u8; 33];

/// Denomination used for stake and fees.
pub const BOND_DENOM: &str = "stake";

/// Tokens per unit of consensus power.
pub const POWER_REDUCTION: u128 = 1_000_000;

/// A 20-byte account address.
///
/// Serialized as 40 lowercase hex characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Wrap raw address bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An amount of a single denomination.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `stake`.
    pub denom: String,
    /// Amount in base units, string encoded.
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

impl Coin {
    /// Create a coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Create a coin in the bond denomination.
    pub fn stake(amount: u128) -> Self {
        Self::new(BOND_DENOM, amount)
    }
}

/// A change to the active validator set produced by genesis initialization.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    /// Consensus public key of the validator.
    #[serde_as(as = "Bytes")]
    pub pub_key: PublicKeyBytes,
    /// Voting power (tokens / `POWER_REDUCTION`).
    pub power: i64,
}
