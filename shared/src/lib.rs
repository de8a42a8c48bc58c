//! Shared data model for the trace aggregation core
//!
//! Contains the packet, node, trace, and test-tree types exchanged between
//! the aggregator and the surrounding harness components. Component-internal
//! types (configuration, warnings) live in their respective crates.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
