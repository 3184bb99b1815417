//! # Shared Types Crate
//!
//! Value types used across the simulation genesis workspace.
//!
//! ## Contents
//!
//! - **Identity**: `Address`, `Hash`
//! - **Amounts**: `Coin`, `Dec` (18-digit fixed point, string encoded)
//! - **Consensus**: `ValidatorUpdate` reported by genesis initialization

pub mod decimal;
pub mod entities;
pub mod errors;

pub use decimal::Dec;
pub use entities::*;
pub use errors::*;
