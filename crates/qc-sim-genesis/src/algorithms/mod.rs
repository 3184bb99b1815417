//! # Algorithms
//!
//! - `sampler` - global stake/bonding parameters and genesis timestamps
//! - `ordering` - dependency-respecting generator order

pub mod ordering;
pub mod sampler;

pub use ordering::GeneratorGraph;
pub use sampler::{random_timestamp, resolve_timestamp, sample, MAX_GENESIS_UNIX_SECS, MAX_INITIALLY_BONDED, MAX_INITIAL_STAKE};
