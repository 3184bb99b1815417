//! # Error Types
//!
//! Parsing errors for the shared value types.

use thiserror::Error;

/// Errors raised while parsing shared value types from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Address is not 20 hex-encoded bytes.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Decimal string is not a non-negative fixed-point number.
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    /// Decimal has more fractional digits than supported.
    #[error("Decimal precision exceeded: {digits} fractional digits, max {max}")]
    PrecisionExceeded {
        /// Fractional digits supplied.
        digits: usize,
        /// Maximum supported.
        max: usize,
    },
}
