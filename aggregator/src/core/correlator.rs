//! Request/response correlation
//!
//! Pairs captured packets within each network into one-to-one
//! request/response couples. Responses carrying a correlation hint match
//! exactly; hintless responses addressed to the loopback interface crossed
//! the network boundary through address translation and are matched by
//! scanning backwards for the request that left the gateway on the port the
//! response came back to.

use std::collections::{HashMap, HashSet};

use shared::{CapturedPacket, NetworkId, RequestPacket, ResponsePacket};
use tracing::warn;

use crate::error::AggregationWarning;
use crate::services::NetworkRegistry;

/// Correlate all captured packets, across all networks, into request/response
/// pairs. Unmatched responses are dropped with a warning; they never abort
/// the pass.
pub fn correlate_packets(
    packets: &[CapturedPacket],
    registry: &NetworkRegistry,
) -> (Vec<(RequestPacket, ResponsePacket)>, Vec<AggregationWarning>) {
    let mut sorted: Vec<&CapturedPacket> = packets.iter().collect();
    sorted.sort_by_key(|packet| (packet.timestamp, packet.frame_number));

    // (network, frame) -> position of the request in `sorted`
    let requests_by_frame: HashMap<(&NetworkId, u64), usize> = sorted
        .iter()
        .enumerate()
        .filter(|(_, packet)| packet.is_request())
        .map(|(idx, packet)| ((&packet.network_id, packet.frame_number), idx))
        .collect();

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut pairs = Vec::new();
    let mut warnings = Vec::new();

    for (idx, packet) in sorted.iter().enumerate() {
        if !packet.is_response() {
            continue;
        }

        let matched = match packet.correlation_hint {
            Some(hint) => requests_by_frame
                .get(&(&packet.network_id, hint))
                .copied()
                .filter(|request_idx| !claimed.contains(request_idx)),
            None if packet.destination.ip.is_loopback() => find_gateway_request(&sorted, idx, registry, &claimed),
            None => None,
        };

        match matched {
            Some(request_idx) => {
                claimed.insert(request_idx);
                let request = RequestPacket::try_from(sorted[request_idx].clone());
                let response = ResponsePacket::try_from((*packet).clone());
                if let (Ok(request), Ok(response)) = (request, response) {
                    pairs.push((request, response));
                }
            }
            None => {
                warn!(
                    "no matching request for response frame {} in network {}",
                    packet.frame_number, packet.network_id
                );
                warnings.push(AggregationWarning::UnmatchedResponse {
                    network: packet.network_id.clone(),
                    frame_number: packet.frame_number,
                });
            }
        }
    }

    (pairs, warnings)
}

/// Closest preceding request in the same network that left through the
/// gateway on the port the response came back to. Concurrent requests
/// through the same gateway port are inherently ambiguous; the last
/// preceding match wins. Already-claimed requests are skipped to keep the
/// map one-to-one.
fn find_gateway_request(
    sorted: &[&CapturedPacket],
    response_idx: usize,
    registry: &NetworkRegistry,
    claimed: &HashSet<usize>,
) -> Option<usize> {
    let response = sorted[response_idx];
    let gateway_ip = registry.gateway_ip(&response.network_id)?;

    sorted[..response_idx]
        .iter()
        .enumerate()
        .rev()
        .find(|&(idx, packet)| {
            packet.is_request()
                && packet.network_id == response.network_id
                && !claimed.contains(&idx)
                && packet.source.ip == gateway_ip
                && packet.source.port == response.destination.port
        })
        .map(|(idx, _)| idx)
}
