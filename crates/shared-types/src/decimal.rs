//! # Fixed-Point Decimal
//!
//! Non-negative decimal with 18 fractional digits, used for rates and
//! fractions inside module parameters. Encoded as a string so values survive
//! JSON round-trips exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::TypesError;

/// Number of fractional digits.
pub const DEC_PRECISION: usize = 18;

const SCALE: u128 = 1_000_000_000_000_000_000;

/// Non-negative fixed-point decimal (18 digits of precision).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dec(u128);

impl Dec {
    /// 0.0
    pub const ZERO: Dec = Dec(0);
    /// 1.0
    pub const ONE: Dec = Dec(SCALE);

    /// Build from raw atomics (value × 10^18).
    pub const fn from_atomics(atomics: u128) -> Self {
        Self(atomics)
    }

    /// Build `numerator / denominator`. Returns `None` on a zero denominator
    /// or overflow.
    pub fn from_ratio(numerator: u128, denominator: u128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        numerator.checked_mul(SCALE).map(|n| Self(n / denominator))
    }

    /// Build `value / 100`.
    pub fn percent(value: u128) -> Self {
        Self(value.saturating_mul(SCALE / 100))
    }

    /// Raw atomics.
    pub fn atomics(&self) -> u128 {
        self.0
    }

    /// Whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Dec) -> Option<Dec> {
        self.0.checked_add(other.0).map(Dec)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:018}", self.0 / SCALE, self.0 % SCALE)
    }
}

impl FromStr for Dec {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidDecimal(s.to_string());
        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac_part.len() > DEC_PRECISION {
            return Err(TypesError::PrecisionExceeded {
                digits: frac_part.len(),
                max: DEC_PRECISION,
            });
        }

        let int: u128 = int_part.parse().map_err(|_| invalid())?;
        let mut frac: u128 = 0;
        if !frac_part.is_empty() {
            frac = frac_part.parse().map_err(|_| invalid())?;
            frac *= 10u128.pow((DEC_PRECISION - frac_part.len()) as u32);
        }

        int.checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac))
            .map(Dec)
            .ok_or_else(invalid)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
