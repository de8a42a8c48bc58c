//! Aggregation pipeline stages
//!
//! Each stage is a pure function from the previous stage's output (plus the
//! read-only registry) to a fresh collection and a list of warnings; the
//! session chains them in order.

pub mod correlator;
pub mod matcher;
pub mod resolver;
pub mod reviser;
pub mod session;
pub mod streams;

pub use correlator::correlate_packets;
pub use matcher::match_test_windows;
pub use resolver::{resolve_node, resolve_traces, ResolutionContext};
pub use reviser::revise_root_clients;
pub use session::{AggregationReport, AggregatorSession};
pub use streams::{assign_streams, group_streams};
