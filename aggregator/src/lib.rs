//! Network trace aggregation core for the end-to-end test harness
//!
//! Turns raw per-network captured HTTP packets into causally ordered
//! request/response streams, attributes each hop to a logical network
//! participant, and matches every trace to the test execution that produced
//! it. Collection is best-effort throughout: any failure degrades to fewer
//! or less precise traces, never to an aborted test run.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types
pub use config::{AggregatorConfig, AggregatorConfigBuilder};
pub use core::{AggregationReport, AggregatorSession};
pub use error::{AggregationWarning, AggregatorError, AggregatorResult};
pub use services::*;
pub use traits::*;
