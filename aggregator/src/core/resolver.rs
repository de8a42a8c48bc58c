//! Endpoint-to-node resolution
//!
//! A ranked cascade of pure resolution strategies turns raw packet
//! endpoints into logical network nodes: registered container, network
//! gateway, then the test runner (with Host-header virtual-host lookup for
//! stubbed endpoints). An endpoint no strategy recognizes stays unresolved
//! and the trace keeps a `None` participant.

use std::net::IpAddr;

use shared::{Endpoint, Headers, NetworkId, NetworkNode, RequestPacket, ResponsePacket, Trace};
use tracing::warn;

use crate::error::AggregationWarning;
use crate::services::NetworkRegistry;

/// Everything a single strategy may consult when resolving one endpoint.
pub struct ResolutionContext<'a> {
    pub registry: &'a NetworkRegistry,
    pub network: &'a NetworkId,
    pub ip: IpAddr,
    pub port: u16,
    pub headers: &'a Headers,
    pub http_ports: &'a [u16],
}

type Strategy = fn(&ResolutionContext<'_>) -> Option<NetworkNode>;

/// Strategies in priority order; the first hit wins.
const STRATEGIES: [Strategy; 3] = [resolve_registered, resolve_gateway, resolve_runner];

/// Resolve one endpoint, or `None` when no strategy applies.
pub fn resolve_node(ctx: &ResolutionContext<'_>) -> Option<NetworkNode> {
    STRATEGIES.iter().find_map(|strategy| strategy(ctx))
}

fn resolve_registered(ctx: &ResolutionContext<'_>) -> Option<NetworkNode> {
    ctx.registry.resolve(ctx.network, ctx.ip)
}

fn resolve_gateway(ctx: &ResolutionContext<'_>) -> Option<NetworkNode> {
    ctx.registry
        .gateway(ctx.network)
        .filter(|gateway| gateway.ip_address == Some(ctx.ip))
}

/// Traffic to the host IP on an HTTP(S) default port may target a stubbed
/// virtual host; the request's `Host` header disambiguates before falling
/// back to the generic runner node.
fn resolve_runner(ctx: &ResolutionContext<'_>) -> Option<NetworkNode> {
    if ctx.ip != ctx.registry.runner_ip() {
        return None;
    }

    if ctx.http_ports.contains(&ctx.port) && ctx.registry.has_mock_hosts() {
        if let Some(node) = ctx.headers.host().and_then(|host| ctx.registry.resolve_mock_host(&host)) {
            return Some(node);
        }
    }

    Some(ctx.registry.runner_node())
}

/// Build traces from correlated pairs, resolving client and server for
/// each.
pub fn resolve_traces(
    pairs: Vec<(RequestPacket, ResponsePacket)>,
    registry: &NetworkRegistry,
    http_ports: &[u16],
) -> (Vec<Trace>, Vec<AggregationWarning>) {
    let mut traces = Vec::with_capacity(pairs.len());
    let mut warnings = Vec::new();

    for (request, response) in pairs {
        let client = resolve_endpoint(registry, http_ports, &request, request.source, &mut warnings);
        let server = resolve_endpoint(registry, http_ports, &request, request.destination, &mut warnings);
        traces.push(Trace::new(request, response, client, server));
    }

    (traces, warnings)
}

fn resolve_endpoint(
    registry: &NetworkRegistry,
    http_ports: &[u16],
    request: &RequestPacket,
    endpoint: Endpoint,
    warnings: &mut Vec<AggregationWarning>,
) -> Option<NetworkNode> {
    let ctx = ResolutionContext {
        registry,
        network: &request.network_id,
        ip: endpoint.ip,
        port: endpoint.port,
        headers: &request.headers,
        http_ports,
    };

    let node = resolve_node(&ctx);
    if node.is_none() {
        warn!("no known node for {} in network {}", endpoint.ip, request.network_id);
        warnings.push(AggregationWarning::UnresolvedEndpoint {
            network: request.network_id.clone(),
            ip: endpoint.ip,
        });
    }
    node
}
