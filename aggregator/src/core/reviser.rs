//! Top-level client re-attribution
//!
//! A stream root whose request entered through the network gateway has no
//! causal parent inside the topology, so the traffic originated outside the
//! monitored network: the true caller is the test runner, whatever the
//! resolver assigned first.

use shared::Trace;

use crate::services::NetworkRegistry;

pub fn revise_root_clients(traces: Vec<Trace>, registry: &NetworkRegistry) -> Vec<Trace> {
    traces
        .into_iter()
        .map(|trace| {
            let entered_via_gateway = trace.is_root()
                && registry.gateway_ip(&trace.network_id) == Some(trace.request.source.ip);
            if entered_via_gateway {
                let runner = registry.runner_node();
                trace.with_client(runner)
            } else {
                trace
            }
        })
        .collect()
}
