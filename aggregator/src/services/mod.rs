//! Service implementations backing the aggregation core

pub mod capture;
pub mod collector;
pub mod network_registry;

#[cfg(test)]
pub mod tests;

pub use capture::ExecPacketCapture;
pub use collector::CollectorPool;
pub use network_registry::{discover_runner_ip, NetworkRegistry};
