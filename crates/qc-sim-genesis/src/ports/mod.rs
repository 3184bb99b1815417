//! # Ports
//!
//! Contracts between the assembler and the modules it coordinates:
//!
//! - `generator` - randomized genesis generation per module
//! - `lifecycle` - default / validate / init / export against a live app
//! - `store` - key-value access to live application state

pub mod generator;
pub mod lifecycle;
pub mod store;

pub use generator::*;
pub use lifecycle::*;
pub use store::*;
