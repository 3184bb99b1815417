//! # Domain Module
//!
//! Core types for simulation genesis assembly: accounts, composite state,
//! sampled parameters, app params and snapshot documents.

pub mod composite;
pub mod entities;
pub mod errors;
pub mod params;
pub mod snapshot;

pub use composite::*;
pub use entities::*;
pub use errors::*;
pub use params::*;
pub use snapshot::*;
