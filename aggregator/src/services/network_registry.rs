//! Network node registry
//!
//! Maps `(network, ip)` to logical participants. Mutated concurrently while
//! containers come up; read-only once the aggregation pass starts. Entries
//! live for the lifetime of the session — container restarts reuse IPs, so
//! re-registration overwrites (last writer wins).

use std::collections::HashMap;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::RwLock;

use shared::{NetworkId, NetworkNode, NodeType, NODE_COLORS};
use tracing::{debug, warn};

use crate::config::{FALLBACK_RUNNER_IP, RUNNER_SENTINEL_HOST};
use crate::error::AggregationWarning;

/// Registry of all known participants for one aggregation session.
pub struct NetworkRegistry {
    inner: RwLock<RegistryState>,
    runner_ip: IpAddr,
}

struct RegistryState {
    nodes: HashMap<(NetworkId, IpAddr), NetworkNode>,
    gateways: HashMap<NetworkId, NetworkNode>,
    mock_hosts: HashMap<String, NetworkNode>,
    runner: Option<NetworkNode>,
    color_cursor: usize,
}

impl RegistryState {
    fn next_color(&mut self) -> String {
        let color = NODE_COLORS[self.color_cursor % NODE_COLORS.len()];
        self.color_cursor += 1;
        color.to_string()
    }
}

impl NetworkRegistry {
    /// `mock_hosts` maps virtual hostnames to display names; the stub nodes
    /// are materialized immediately since the map is fixed per session.
    pub fn new(runner_ip: IpAddr, mock_hosts: &HashMap<String, String>) -> Self {
        let mut state = RegistryState {
            nodes: HashMap::new(),
            gateways: HashMap::new(),
            mock_hosts: HashMap::new(),
            runner: None,
            color_cursor: 0,
        };

        let mut hostnames: Vec<&String> = mock_hosts.keys().collect();
        hostnames.sort();
        for hostname in hostnames {
            let color = state.next_color();
            let node = NetworkNode::new(NodeType::MockServer, None, mock_hosts[hostname].clone(), color);
            state.mock_hosts.insert(hostname.to_ascii_lowercase(), node);
        }

        Self {
            inner: RwLock::new(state),
            runner_ip,
        }
    }

    /// Record a container observed at `(network, ip)`.
    pub fn register_container(&self, network: &NetworkId, ip: IpAddr, display_name: &str) {
        let mut state = self.inner.write().unwrap();
        let color = state.next_color();
        let node = NetworkNode::new(NodeType::Container, Some(ip), display_name, color);
        debug!("registered container {display_name} at {ip} on network {network}");
        state.nodes.insert((network.clone(), ip), node);
    }

    /// Record the address through which traffic enters `network` from
    /// outside.
    pub fn register_gateway(&self, network: &NetworkId, ip: IpAddr) {
        let mut state = self.inner.write().unwrap();
        let color = state.next_color();
        let node = NetworkNode::new(NodeType::NetworkGateway, Some(ip), "gateway", color);
        debug!("registered gateway {ip} for network {network}");
        state.gateways.insert(network.clone(), node);
    }

    /// Exact `(network, ip)` lookup among registered containers.
    pub fn resolve(&self, network: &NetworkId, ip: IpAddr) -> Option<NetworkNode> {
        let state = self.inner.read().unwrap();
        state.nodes.get(&(network.clone(), ip)).cloned()
    }

    pub fn gateway(&self, network: &NetworkId) -> Option<NetworkNode> {
        let state = self.inner.read().unwrap();
        state.gateways.get(network).cloned()
    }

    pub fn gateway_ip(&self, network: &NetworkId) -> Option<IpAddr> {
        self.gateway(network).and_then(|node| node.ip_address)
    }

    /// The fixed test-runner node, created on first use.
    pub fn runner_node(&self) -> NetworkNode {
        let mut state = self.inner.write().unwrap();
        if let Some(node) = &state.runner {
            return node.clone();
        }
        let color = state.next_color();
        let node = NetworkNode::new(NodeType::TestRunner, Some(self.runner_ip), "test runner", color);
        state.runner = Some(node.clone());
        node
    }

    pub fn runner_ip(&self) -> IpAddr {
        self.runner_ip
    }

    /// Stub lookup by virtual hostname, case-insensitive.
    pub fn resolve_mock_host(&self, hostname: &str) -> Option<NetworkNode> {
        let state = self.inner.read().unwrap();
        state.mock_hosts.get(&hostname.to_ascii_lowercase()).cloned()
    }

    pub fn has_mock_hosts(&self) -> bool {
        let state = self.inner.read().unwrap();
        !state.mock_hosts.is_empty()
    }

    /// Every network with at least one registered participant or gateway.
    pub fn networks(&self) -> Vec<NetworkId> {
        let state = self.inner.read().unwrap();
        let mut networks: Vec<NetworkId> = state
            .nodes
            .keys()
            .map(|(network, _)| network.clone())
            .chain(state.gateways.keys().cloned())
            .collect();
        networks.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        networks.dedup();
        networks
    }
}

/// Determine the IP the test runner is reachable at from inside the
/// monitored networks: operator override, else the sentinel hostname, else
/// a fixed fallback (degraded, non-fatal).
pub fn discover_runner_ip(override_ip: Option<IpAddr>) -> (IpAddr, Option<AggregationWarning>) {
    if let Some(ip) = override_ip {
        return (ip, None);
    }

    match (RUNNER_SENTINEL_HOST, 0u16).to_socket_addrs() {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => {
                debug!("resolved {RUNNER_SENTINEL_HOST} to {}", addr.ip());
                (addr.ip(), None)
            }
            None => runner_ip_fallback("sentinel resolved to no addresses".to_string()),
        },
        Err(e) => runner_ip_fallback(e.to_string()),
    }
}

fn runner_ip_fallback(reason: String) -> (IpAddr, Option<AggregationWarning>) {
    warn!("test-runner IP discovery failed ({reason}); falling back to {FALLBACK_RUNNER_IP}");
    (
        FALLBACK_RUNNER_IP,
        Some(AggregationWarning::RunnerIpFallback {
            fallback: FALLBACK_RUNNER_IP,
            reason,
        }),
    )
}
