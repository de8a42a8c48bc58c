//! Aggregation session
//!
//! Owns the registry, collector pool, and all derived state for one test
//! run, and drives the collection → correlation → attribution pipeline.
//! Constructed per run; nothing here outlives the session, so state can
//! never leak across runs.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use shared::{NetworkId, Stream, TestExecutionNode, TestNodeId, Trace};
use tracing::info;

use crate::config::AggregatorConfig;
use crate::core::correlator::correlate_packets;
use crate::core::matcher::match_test_windows;
use crate::core::resolver::resolve_traces;
use crate::core::reviser::revise_root_clients;
use crate::core::streams::{assign_streams, group_streams};
use crate::error::AggregationWarning;
use crate::services::{discover_runner_ip, CollectorPool, NetworkRegistry};
use crate::traits::PacketCapture;

/// Output of one aggregation pass.
#[derive(Debug)]
pub struct AggregationReport {
    /// Traces per matched test node, grouped and ordered by stream.
    pub assignments: HashMap<TestNodeId, Vec<Trace>>,
    /// All reconstructed streams, ordered by root request time.
    pub streams: Vec<Stream>,
    /// Diagnostics accumulated across every stage.
    pub warnings: Vec<AggregationWarning>,
}

/// One test run's aggregation state and pipeline.
pub struct AggregatorSession {
    config: AggregatorConfig,
    registry: Arc<NetworkRegistry>,
    pool: CollectorPool,
    startup_warnings: Vec<AggregationWarning>,
}

impl AggregatorSession {
    pub fn new(config: AggregatorConfig, capture: Arc<dyn PacketCapture>) -> Self {
        let (runner_ip, warning) = discover_runner_ip(config.runner_ip_override);
        let registry = Arc::new(NetworkRegistry::new(runner_ip, &config.mock_hosts));

        Self {
            pool: CollectorPool::new(capture),
            registry,
            config,
            startup_warnings: warning.into_iter().collect(),
        }
    }

    /// Registry handle for container-lifecycle listeners.
    pub fn registry(&self) -> Arc<NetworkRegistry> {
        Arc::clone(&self.registry)
    }

    /// Container-start event from the harness; may arrive concurrently
    /// with other lifecycle events.
    pub fn on_container_started(&self, network: &NetworkId, ip: IpAddr, display_name: &str) {
        self.registry.register_container(network, ip, display_name);
    }

    /// Gateway address of a monitored network, known once the network is
    /// inspected.
    pub fn on_gateway_discovered(&self, network: &NetworkId, ip: IpAddr) {
        self.registry.register_gateway(network, ip);
    }

    /// Run the full aggregation pass. Call once, after every test has
    /// finished; the registry is treated as read-only from here on.
    pub async fn collect_traces(&self, roots: &[TestExecutionNode]) -> AggregationReport {
        // Let the capture pipeline flush its buffers before pulling batches.
        tokio::time::sleep(self.config.settle_delay).await;

        let mut warnings = self.startup_warnings.clone();

        let networks = self.registry.networks();
        let (packets, stage) = self.pool.collect_all(&networks).await;
        warnings.extend(stage);

        let (pairs, stage) = correlate_packets(&packets, &self.registry);
        warnings.extend(stage);

        let (traces, stage) = resolve_traces(pairs, &self.registry, &self.config.http_ports);
        warnings.extend(stage);

        let traces = assign_streams(traces);
        let traces = revise_root_clients(traces, &self.registry);
        let streams = group_streams(traces);

        let (assignments, stage) = match_test_windows(roots, &streams);
        warnings.extend(stage);

        info!(
            "aggregated {} streams from {} packets across {} networks ({} warnings)",
            streams.len(),
            packets.len(),
            networks.len(),
            warnings.len()
        );

        AggregationReport {
            assignments,
            streams,
            warnings,
        }
    }
}
