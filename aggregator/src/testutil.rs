//! Packet, trace, and registry helpers shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use shared::{CapturedPacket, Endpoint, Headers, NetworkId, PacketDetail, RequestPacket, ResponsePacket, Trace};

use crate::services::NetworkRegistry;

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn next_frame() -> u64 {
    FRAME_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Fixed epoch plus `offset_ms`, so tests read as relative timelines.
pub fn ts(offset_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_760_000_000_000 + offset_ms).unwrap()
}

pub fn ep(addr: &str) -> Endpoint {
    addr.parse().expect("endpoint must be ip:port")
}

pub fn request(network: &str, frame: u64, at_ms: i64, source: &str, destination: &str) -> CapturedPacket {
    CapturedPacket {
        frame_number: frame,
        network_id: NetworkId::from(network),
        timestamp: ts(at_ms),
        source: ep(source),
        destination: ep(destination),
        protocol_version: "HTTP/1.1".to_string(),
        headers: Headers::new(),
        payload: None,
        detail: PacketDetail::Request {
            method: "GET".to_string(),
            path: "/".to_string(),
        },
        correlation_hint: None,
    }
}

pub fn response(
    network: &str,
    frame: u64,
    at_ms: i64,
    source: &str,
    destination: &str,
    hint: Option<u64>,
) -> CapturedPacket {
    CapturedPacket {
        frame_number: frame,
        network_id: NetworkId::from(network),
        timestamp: ts(at_ms),
        source: ep(source),
        destination: ep(destination),
        protocol_version: "HTTP/1.1".to_string(),
        headers: Headers::new(),
        payload: None,
        detail: PacketDetail::Response {
            status_code: 200,
            status_text: "OK".to_string(),
        },
        correlation_hint: hint,
    }
}

/// Unresolved trace spanning `[start_ms, end_ms]` between two endpoints.
pub fn trace_span(network: &str, start_ms: i64, end_ms: i64, source: &str, destination: &str) -> Trace {
    let req_frame = next_frame();
    let resp_frame = next_frame();
    let req = RequestPacket::try_from(request(network, req_frame, start_ms, source, destination)).unwrap();
    let resp =
        ResponsePacket::try_from(response(network, resp_frame, end_ms, destination, source, Some(req_frame)))
            .unwrap();
    Trace::new(req, resp, None, None)
}

pub fn registry(runner_ip: &str) -> NetworkRegistry {
    NetworkRegistry::new(runner_ip.parse().unwrap(), &HashMap::new())
}

pub fn registry_with_mocks(runner_ip: &str, mocks: &[(&str, &str)]) -> NetworkRegistry {
    let mock_hosts: HashMap<String, String> = mocks
        .iter()
        .map(|(host, name)| (host.to_string(), name.to_string()))
        .collect();
    NetworkRegistry::new(runner_ip.parse().unwrap(), &mock_hosts)
}
