//! Aggregator session configuration

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Hostname that resolves to the host machine from inside Docker networks.
pub const RUNNER_SENTINEL_HOST: &str = "host.docker.internal";

/// Default bridge gateway, used when sentinel resolution fails.
pub const FALLBACK_RUNNER_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(172, 17, 0, 1));

/// Ports treated as HTTP(S) defaults for virtual-host resolution.
pub const DEFAULT_HTTP_PORTS: [u16; 3] = [80, 443, 8080];

/// Configuration for one aggregation session.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Operator-supplied test-runner IP; skips sentinel resolution.
    pub runner_ip_override: Option<IpAddr>,
    /// Sleep before collection starts, letting the capture pipeline flush
    /// its internal buffers.
    pub settle_delay: Duration,
    /// Virtual hostname → display name of stubbed endpoints.
    pub mock_hosts: HashMap<String, String>,
    /// Ports eligible for Host-header virtual-host resolution.
    pub http_ports: Vec<u16>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            runner_ip_override: None,
            settle_delay: Duration::from_secs(2),
            mock_hosts: HashMap::new(),
            http_ports: DEFAULT_HTTP_PORTS.to_vec(),
        }
    }
}

impl AggregatorConfig {
    pub fn builder() -> AggregatorConfigBuilder {
        AggregatorConfigBuilder::new()
    }

    /// Default configuration with `HARNESS_RUNNER_IP` and
    /// `HARNESS_SETTLE_MS` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ip) = std::env::var("HARNESS_RUNNER_IP").ok().and_then(|v| v.parse().ok()) {
            config.runner_ip_override = Some(ip);
        }
        if let Some(ms) = std::env::var("HARNESS_SETTLE_MS").ok().and_then(|v| v.parse().ok()) {
            config.settle_delay = Duration::from_millis(ms);
        }
        config
    }
}

/// Builder for [`AggregatorConfig`].
pub struct AggregatorConfigBuilder {
    config: AggregatorConfig,
}

impl AggregatorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AggregatorConfig::default(),
        }
    }

    /// Set the test-runner IP explicitly, skipping discovery.
    pub fn runner_ip(mut self, ip: IpAddr) -> Self {
        self.config.runner_ip_override = Some(ip);
        self
    }

    /// Set the pre-collection settle delay.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Register one stubbed virtual host.
    pub fn mock_host<H: Into<String>, D: Into<String>>(mut self, hostname: H, display_name: D) -> Self {
        self.config.mock_hosts.insert(hostname.into(), display_name.into());
        self
    }

    /// Replace the whole virtual-host map.
    pub fn mock_hosts(mut self, hosts: HashMap<String, String>) -> Self {
        self.config.mock_hosts = hosts;
        self
    }

    /// Replace the ports eligible for virtual-host resolution.
    pub fn http_ports(mut self, ports: Vec<u16>) -> Self {
        self.config.http_ports = ports;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AggregatorConfig {
        self.config
    }
}

impl Default for AggregatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
